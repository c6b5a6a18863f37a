use std::future::Future;

use autotheme_app::ports::PlaceResolver;
use autotheme_domain::error::AutoThemeError;
use autotheme_domain::location::Coordinates;

/// Uses the formatted coordinates as the place name.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinatePlaceResolver;

impl PlaceResolver for CoordinatePlaceResolver {
    fn resolve(
        &self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<String, AutoThemeError>> + Send {
        async move { Ok(coordinates.to_string()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_name_place_by_coordinates() {
        let name = CoordinatePlaceResolver
            .resolve(Coordinates::new(47.3769, 8.5417).unwrap())
            .await
            .unwrap();
        assert_eq!(name, "Lat 47.377 / Lon 8.542");
    }
}
