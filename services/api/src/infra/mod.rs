pub mod db;
pub mod import;
pub mod password;
pub mod pdf;
pub mod storage;
