pub mod hero;

pub use hero::{Hero, HeroChanges, HeroId, InvalidHeroId, NewHero};
