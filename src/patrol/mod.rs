pub mod patrol;
