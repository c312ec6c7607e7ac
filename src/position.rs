use crate::error::PositionError;
use crate::types::Coords;

/// Where the user currently is, or why that is unknown.
pub trait PositionProvider {
    fn current_position(&self) -> Result<Coords, PositionError>;
}

/// A position the user typed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition(pub Coords);

impl FixedPosition {
    pub fn new(lat: f64, lng: f64) -> Result<Self, PositionError> {
        Ok(Self(Coords::new(lat, lng)?))
    }
}

impl PositionProvider for FixedPosition {
    fn current_position(&self) -> Result<Coords, PositionError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_position_validates_once() {
        assert!(matches!(
            FixedPosition::new(f64::NAN, 0.0),
            Err(PositionError::Invalid(_))
        ));
        let p = FixedPosition::new(38.7, -9.1).unwrap();
        assert_eq!(p.current_position().unwrap().lng(), -9.1);
    }
}
