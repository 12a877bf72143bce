// Domain modules

pub mod links;
