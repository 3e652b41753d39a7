pub mod provider;
pub mod schedule;

pub use provider::ProviderService;
pub use schedule::ScheduleService;
