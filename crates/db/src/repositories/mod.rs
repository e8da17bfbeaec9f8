mod prediction_repo;

pub use prediction_repo::PredictionRepo;
