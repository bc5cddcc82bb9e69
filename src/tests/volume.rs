#[cfg(test)]
mod volume {
    use crate::{StateError, Volume};

    #[test]
    fn float_converts_percent() {
        let volume = Volume { inner: 75 };
        assert!((volume.float() - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn default_is_half() {
        assert_eq!(Volume::default().percent(), 50);
    }

    #[test]
    fn accepts_bounds() {
        assert_eq!(Volume::from_percent(0).unwrap().float(), 0.0);
        assert_eq!(Volume::from_percent(100).unwrap().float(), 1.0);
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(Volume::from_percent(150), Err(StateError::OutOfRange(150)));
        assert_eq!(Volume::from_percent(101), Err(StateError::OutOfRange(101)));
        assert_eq!(Volume::from_percent(-1), Err(StateError::OutOfRange(-1)));
    }

    #[test]
    fn displays_as_percentage() {
        assert_eq!(Volume::from_percent(40).unwrap().to_string(), "40%");
    }
}
