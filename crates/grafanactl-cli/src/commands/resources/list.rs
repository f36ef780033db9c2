//! `grafanactl resources list` — print the resource kinds a server advertises.

use crate::error::CliError;
use crate::exit_codes;
use crate::session::Session;

pub async fn run(session: &Session, wide: bool) -> Result<i32, CliError> {
    let descriptors = session.registry.preferred_resources().await;
    let mut rows: Vec<_> = descriptors.iter().collect();
    rows.sort_by(|a, b| (a.group.as_str(), a.kind.as_str()).cmp(&(b.group.as_str(), b.kind.as_str())));

    if wide {
        println!("{:<30}{:<20}{:<30}{}", "KIND", "VERSION", "GROUP", "PLURAL");
    } else {
        println!("{:<30}{}", "KIND", "GROUP");
    }
    for descriptor in rows {
        if wide {
            println!("{:<30}{:<20}{:<30}{}", descriptor.kind, descriptor.version, descriptor.group, descriptor.plural);
        } else {
            println!("{:<30}{}", descriptor.kind, descriptor.group);
        }
    }

    Ok(exit_codes::SUCCESS)
}
