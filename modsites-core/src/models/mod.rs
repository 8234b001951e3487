pub mod feature;
pub mod site;
pub mod site_set;
pub mod strand;
pub mod transcript;

// re-export for cleaner imports
pub use self::feature::FeatureKind;
pub use self::site::Site;
pub use self::site_set::SiteSet;
pub use self::strand::Strand;
pub use self::transcript::{Segment, TranscriptHit, TranscriptModel};
