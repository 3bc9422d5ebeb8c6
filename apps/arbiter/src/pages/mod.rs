pub mod decision;
pub mod home;

pub use decision::DecisionPage;
pub use home::HomePage;

#[cfg(test)]
#[path = "../tests/fake_backend.rs"]
pub(crate) mod fake_backend;

#[cfg(test)]
#[path = "../tests/pages_tests.rs"]
mod tests;
