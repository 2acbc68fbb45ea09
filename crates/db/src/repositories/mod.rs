pub mod analysis_repo;
pub mod card_repo;
pub mod generation_repo;

pub use analysis_repo::AnalysisRepo;
pub use card_repo::CardRepo;
pub use generation_repo::GenerationRepo;
