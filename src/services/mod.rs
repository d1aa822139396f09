pub mod assignment_service;
pub mod catalog_service;
pub mod forum_service;
pub mod generative_task_service;
pub mod ledger_service;
pub mod user_service;

pub use assignment_service::AssignmentService;
pub use catalog_service::CatalogService;
pub use forum_service::ForumService;
pub use generative_task_service::GenerativeTaskService;
pub use ledger_service::LedgerService;
pub use user_service::UserService;
