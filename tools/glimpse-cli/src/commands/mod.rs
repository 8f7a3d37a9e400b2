pub mod check;
pub mod init_region;
pub mod inspect;
pub mod run;
