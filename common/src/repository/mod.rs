pub mod db;
pub mod has_mongo_indexes;
pub mod index_trait;
pub mod memory_repository;
pub mod repository_util;
