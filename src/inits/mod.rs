use crate::KMeansError;
use std::{fmt, str::FromStr};

pub(crate) mod farthestfirst;
pub(crate) mod kmeanplusplus;
pub(crate) mod precomputed;
pub(crate) mod randomsample;

/// Named centroid initialization methods, as used on the wire (`initMethod`).
///
/// | name                            | method                                    |
/// |---------------------------------|-------------------------------------------|
/// | `random`                        | [`KMeans::init_random_sample`](crate::KMeans::init_random_sample) |
/// | `farthest`, `farthest-first`    | [`KMeans::init_farthest_first`](crate::KMeans::init_farthest_first) |
/// | `kmeans++`, `k-means++`         | [`KMeans::init_kmeanplusplus`](crate::KMeans::init_kmeanplusplus) |
/// | `manual`                        | [`KMeans::init_precomputed`](crate::KMeans::init_precomputed) |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InitMethod {
    RandomSample,
    FarthestFirst,
    KMeanPlusPlus,
    Manual
}

impl FromStr for InitMethod {
    type Err = KMeansError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" | "random-sample" => Ok(InitMethod::RandomSample),
            "farthest" | "farthest-first" | "farthest_first" => Ok(InitMethod::FarthestFirst),
            "kmeans++" | "k-means++" | "kmeanplusplus" => Ok(InitMethod::KMeanPlusPlus),
            "manual" => Ok(InitMethod::Manual),
            _ => Err(KMeansError::UnknownInitMethod(s.to_string()))
        }
    }
}

impl fmt::Display for InitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitMethod::RandomSample => "random",
            InitMethod::FarthestFirst => "farthest",
            InitMethod::KMeanPlusPlus => "kmeans++",
            InitMethod::Manual => "manual",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wire_names() {
        assert_eq!("random".parse::<InitMethod>(), Ok(InitMethod::RandomSample));
        assert_eq!("farthest".parse::<InitMethod>(), Ok(InitMethod::FarthestFirst));
        assert_eq!("Farthest-First".parse::<InitMethod>(), Ok(InitMethod::FarthestFirst));
        assert_eq!("kmeans++".parse::<InitMethod>(), Ok(InitMethod::KMeanPlusPlus));
        assert_eq!("manual".parse::<InitMethod>(), Ok(InitMethod::Manual));
        assert_eq!("spectral".parse::<InitMethod>(), Err(KMeansError::UnknownInitMethod("spectral".to_string())));
    }

    #[test]
    fn display_round_trips() {
        for method in [InitMethod::RandomSample, InitMethod::FarthestFirst, InitMethod::KMeanPlusPlus, InitMethod::Manual] {
            assert_eq!(method.to_string().parse::<InitMethod>(), Ok(method));
        }
    }
}
