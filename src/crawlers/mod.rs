pub mod fixture;
pub mod webdriver;

pub use fixture::FixturePageClient;
pub use webdriver::WebDriverSession;
