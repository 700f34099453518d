mod meta;

pub use meta::{MetaCache, MetaFetcher, OgFetcher, EMPTY_META_TTL_HOURS, META_TTL_DAYS};
