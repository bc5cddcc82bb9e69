#[cfg(test)]
mod registry {
    use crate::{
        device::{Completion, Device, DeviceError},
        PlayableItem, Registry, SessionId, Volume,
    };

    /// Does nothing at all.
    struct Null;

    impl Device<()> for Null {
        fn start(&mut self, _: &PlayableItem<()>, _: f32, _: Completion) -> Result<(), DeviceError> {
            Ok(())
        }

        fn pause(&mut self) {}
        fn resume(&mut self) {}
        fn stop(&mut self) {}

        fn is_playing(&self) -> bool {
            false
        }

        fn is_paused(&self) -> bool {
            false
        }

        fn disconnect(&mut self) {}
    }

    fn null() -> Result<Box<dyn Device<()>>, DeviceError> {
        Ok(Box::new(Null))
    }

    #[test]
    fn connects_once() {
        let mut registry = Registry::default();
        let mut connects = 0;

        for _ in 0..3 {
            registry
                .get_or_connect(SessionId(1), Volume::default(), || {
                    connects += 1;
                    null()
                })
                .unwrap();
        }

        assert_eq!(connects, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn new_sessions_use_given_volume() {
        let mut registry = Registry::default();
        let volume = Volume::from_percent(80).unwrap();

        let session = registry.get_or_connect(SessionId(1), volume, null).unwrap();
        assert_eq!(session.queue.volume, volume);
        assert!(session.ticket.is_none());
    }

    #[test]
    fn failed_connect_inserts_nothing() {
        let mut registry = Registry::<()>::default();
        let result = registry.get_or_connect(SessionId(7), Volume::default(), || {
            Err(DeviceError::Connect("no channel".into()))
        });

        assert!(result.is_err());
        assert!(!registry.contains(SessionId(7)));
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = Registry::default();
        registry
            .get_or_connect(SessionId(1), Volume::default(), null)
            .unwrap();

        assert!(registry.remove(SessionId(1)).is_some());
        assert!(registry.remove(SessionId(1)).is_none());
        assert!(registry.remove(SessionId(2)).is_none());
        assert!(!registry.contains(SessionId(1)));
    }

    #[test]
    fn sessions_are_independent() {
        let mut registry = Registry::default();
        for id in [1, 2, 3] {
            registry
                .get_or_connect(SessionId(id), Volume::default(), null)
                .unwrap();
        }

        registry
            .get_mut(SessionId(2))
            .unwrap()
            .queue
            .add(PlayableItem::new("A", "a", ()));
        registry.remove(SessionId(3));

        let mut ids = registry.ids();
        ids.sort();
        assert_eq!(ids, [SessionId(1), SessionId(2)]);
        assert!(registry.get(SessionId(1)).unwrap().queue.is_empty());
        assert_eq!(registry.get(SessionId(2)).unwrap().queue.len(), 1);
    }
}
