pub mod memory;
pub mod metrics;
pub mod mongo;
pub mod store;

pub use memory::InMemoryStore;
pub use self::metrics::{get_metrics, init_metrics};
pub use mongo::MongoDb;
pub use store::{HeroStore, HeroStream};
