pub mod user_repo;
pub use user_repo::UserRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod authorized_email_repo;
pub use authorized_email_repo::AuthorizedEmailRepository;
