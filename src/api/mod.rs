pub mod attendance;
pub mod dashboard;

#[cfg(test)]
mod tests;
