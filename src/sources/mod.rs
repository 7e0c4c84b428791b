use crate::model::Application;
use anyhow::Result;

pub trait Source {
    fn scan(&self) -> Result<Vec<Application>>;
}

pub mod folders;
pub mod manual;
