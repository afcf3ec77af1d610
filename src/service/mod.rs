pub mod case_service;
pub mod token_cache;
