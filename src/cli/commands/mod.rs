pub mod budget;
pub mod config;
pub mod data;
pub mod expense;
pub mod report;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in expense::definitions()
        .into_iter()
        .chain(budget::definitions())
        .chain(report::definitions())
        .chain(data::definitions())
        .chain(config::definitions())
        .chain(system::definitions())
    {
        registry.register(entry);
    }
}
