pub mod extract;
pub mod flow;
pub mod flows;
pub mod handlers;
pub mod invoker;
pub mod models;
pub mod prompts;
pub mod template;

#[cfg(test)]
pub mod testing;
