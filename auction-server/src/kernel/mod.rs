pub mod db;
pub mod entities;
