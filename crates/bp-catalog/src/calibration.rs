//! Built-in calibration.
//!
//! Gravity coefficients, mode-choice vectors and trip-generation rates
//! estimated from Swedish travel-survey data, plus the class map for
//! OpenStreetMap-derived POI `fclass` values.  Use
//! [`Catalog::default_calibration`] when no calibration files are supplied.

use crate::{Catalog, CatalogBuilder, CatalogResult, CategoryParams, ModeCoefficients};

/// Category assigned to every workplace destination.
pub const WORK: &str = "work";

/// Category assigned to every school destination when a school layer is used.
pub const SCHOOL: &str = "school";

// (name, β per km, bike coefficients, e-bike coefficients, trips per person per day)
const CATEGORIES: [(&str, f64, [f64; 4], [f64; 4], f64); 5] = [
    (
        WORK,
        -0.0370,
        [0.5949151637706399, -7.2431452984131885, 0.05740860644694539, -0.18442318504135605],
        [0.07166876549536741, -2.3744188449615566, -1.7157610670509382, -0.6012328640390996],
        1.52,
    ),
    (
        "leisure",
        -0.0351,
        [1.5641575146847442, -2.4196921105723215, 5.526990391189266, -3.331767479111909],
        [0.04333028543699834, -1.5403262612251727, 4.310711954186476, -0.588298193854497],
        0.4,
    ),
    (
        "shopping",
        -0.0833,
        [-0.44391129463248735, 0.045421282463330465, -3.904112256228761, 0.5687733506577125],
        [-0.6498748953606043, -0.29797345841414963, -3.3602305317530834, -0.7290932553055972],
        0.18,
    ),
    (
        "services",
        -0.0833,
        [-8.295618349118543, -3.751848767649791, 0.3791578463667172, -0.9215795742380404],
        [-3.1822681067845404, -2.1398819794608994, 2.201028708826716, -1.4593795193621433],
        0.18,
    ),
    (
        "touring",
        -0.0351,
        [-2.0871942229142797, -1.6994613073684237, -1.940943420795848, 0.019770984624589937],
        [-0.976798293893275, -1.3330152115670482, -2.5280686380753137, -0.019578406245738936],
        0.07,
    ),
];

const LEISURE_CLASSES: &[&str] = &[
    "attraction", "cinema", "community_centre", "dog_park", "garden_centre", "golf_course",
    "museum", "park", "picnic_site", "pitch", "playground", "sports_centre", "theatre", "track",
];

const SHOPPING_CLASSES: &[&str] = &[
    "bicycle_shop", "clothes", "gift_shop", "mobile_phone_shop", "outdoor_shop", "supermarket",
    "toy_shop", "video_shop",
];

const SERVICES_CLASSES: &[&str] = &[
    "atm", "bank", "bakery", "cafe", "car_dealership", "car_wash", "car_rental", "dentist",
    "fast_food", "hairdresser", "kindergarten", "kiosk", "laundry", "library", "pharmacy",
    "police", "post_box", "post_office", "pub", "recycling", "recycling_paper", "restaurant",
    "school", "toilet", "town_hall", "veterinary",
];

const TOURING_CLASSES: &[&str] = &[
    "artwork", "chalet", "castle", "camp_site", "fountain", "hostel", "hotel", "ruins",
    "tourist_info", "tower", "viewpoint",
];

impl Catalog {
    /// The built-in calibration: `work`, `leisure`, `shopping`, `services`
    /// and `touring`, with the POI class map.
    ///
    /// No `school` category is defined; runs that add a school layer must
    /// supply their own calibration.
    pub fn default_calibration() -> Self {
        // The constant tables above are known-valid, so the builder cannot fail.
        match default_builder() {
            Ok(b) => b.build(),
            Err(e) => unreachable!("built-in calibration is invalid: {e}"),
        }
    }
}

/// A builder pre-populated with the built-in calibration, for callers that
/// want to add categories (e.g. `school`) on top of it.
pub fn default_builder() -> CatalogResult<CatalogBuilder> {
    let mut b = CatalogBuilder::new();
    for (name, beta, bike, ebike, rate) in CATEGORIES {
        b.add_category(CategoryParams::new(
            name,
            beta,
            ModeCoefficients(bike),
            ModeCoefficients(ebike),
            rate,
        ))?;
    }
    for (category, classes) in [
        ("leisure", LEISURE_CLASSES),
        ("shopping", SHOPPING_CLASSES),
        ("services", SERVICES_CLASSES),
        ("touring", TOURING_CLASSES),
    ] {
        for class in classes {
            b.map_class(class, category)?;
        }
    }
    Ok(b)
}
