//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods also used inside the
//! tally transaction accept any Postgres executor instead.

pub mod ballot_repo;
pub mod knowledge_question_repo;
pub mod option_repo;
pub mod population_repo;
pub mod result_repo;
pub mod vote_repo;

pub use ballot_repo::BallotRepo;
pub use knowledge_question_repo::KnowledgeQuestionRepo;
pub use option_repo::OptionRepo;
pub use population_repo::PopulationRepo;
pub use result_repo::ResultRepo;
pub use vote_repo::VoteRepo;
