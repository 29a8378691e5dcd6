pub mod feed;
pub mod gateway;
pub mod handlers;
pub mod store;

#[cfg(test)]
pub mod memory;
