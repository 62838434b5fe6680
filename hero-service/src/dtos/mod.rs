pub mod heroes;

pub use heroes::{
    CreateHeroRequest, DeleteHeroResponse, HeroListParams, HeroResponse, Pagination,
    UpdateHeroRequest, MAX_PAGE_SIZE,
};
