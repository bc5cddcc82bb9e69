#[cfg(test)]
mod completion {
    use tokio::sync::mpsc;

    use crate::{
        device::{Completion, DeviceError, Finished, Ticket},
        SessionId,
    };

    #[test]
    fn finish_sends_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let done = Completion::new(SessionId(3), Ticket(9), tx);
        assert_eq!(done.session(), SessionId(3));

        done.finish(None);

        assert_eq!(
            rx.try_recv().unwrap(),
            Finished {
                session: SessionId(3),
                ticket: Ticket(9),
                error: None,
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn finish_carries_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        Completion::new(SessionId(1), Ticket(1), tx).finish(Some(DeviceError::Playback("x".into())));

        let finished = rx.try_recv().unwrap();
        assert_eq!(finished.error, Some(DeviceError::Playback("x".into())));
    }

    #[test]
    fn dropping_reports_abandoned() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        drop(Completion::new(SessionId(1), Ticket(2), tx));

        let finished = rx.try_recv().unwrap();
        assert_eq!(finished.ticket, Ticket(2));
        assert_eq!(finished.error, Some(DeviceError::Abandoned));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn finishing_from_another_thread() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let done = Completion::new(SessionId(5), Ticket(1), tx);

        std::thread::spawn(move || done.finish(None)).join().unwrap();
        assert_eq!(rx.try_recv().unwrap().session, SessionId(5));
    }

    #[test]
    fn closed_server_is_fine() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        Completion::new(SessionId(1), Ticket(1), tx).finish(None);
    }
}
