//! Destination for finalized entropy.
//!
//! A finalized digest is handed to an [`EntropySink`] passed in by the
//! caller rather than to a process-wide generator, so the accumulator has no
//! hidden coupling. [`CryptoRandom`](crate::CryptoRandom) is the sink used
//! by the CLI. Whether a sink is safe to share between threads is the sink's
//! own business.

use std::sync::Arc;

/// Accepts supplementary random bytes to strengthen internal state.
pub trait EntropySink {
    /// Mix `data` into the sink. Must not fail; implementations ignore
    /// input they cannot use.
    fn add_entropy(&self, data: &[u8]);
}

impl<T: EntropySink + ?Sized> EntropySink for &T {
    fn add_entropy(&self, data: &[u8]) {
        (**self).add_entropy(data)
    }
}

impl<T: EntropySink + ?Sized> EntropySink for Arc<T> {
    fn add_entropy(&self, data: &[u8]) {
        (**self).add_entropy(data)
    }
}

impl<T: EntropySink + ?Sized> EntropySink for Box<T> {
    fn add_entropy(&self, data: &[u8]) {
        (**self).add_entropy(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Vec<u8>>>);

    impl EntropySink for Recorder {
        fn add_entropy(&self, data: &[u8]) {
            self.0.lock().unwrap().push(data.to_vec());
        }
    }

    fn feed(sink: impl EntropySink) {
        sink.add_entropy(b"abc");
    }

    #[test]
    fn test_reference_forwards() {
        let rec = Recorder::default();
        feed(&rec);
        assert_eq!(*rec.0.lock().unwrap(), vec![b"abc".to_vec()]);
    }

    #[test]
    fn test_arc_and_box_forward() {
        let rec = Arc::new(Recorder::default());
        feed(Arc::clone(&rec));
        let boxed: Box<dyn EntropySink> = Box::new(Arc::clone(&rec));
        feed(boxed);
        assert_eq!(rec.0.lock().unwrap().len(), 2);
    }
}
