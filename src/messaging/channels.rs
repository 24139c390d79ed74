// Lock-free channel carrying engine notifications to observers

use crate::messaging::notification::SequencerNotification;
use ringbuf::{HeapRb, traits::Split};

pub type NotificationProducer = ringbuf::HeapProd<SequencerNotification>;
pub type NotificationConsumer = ringbuf::HeapCons<SequencerNotification>;

pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    let rb = HeapRb::<SequencerNotification>::new(capacity);
    rb.split()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_round_trip() {
        let (mut tx, mut rx) = create_notification_channel(4);

        let sent = SequencerNotification::Step { step: 3 };
        assert!(ringbuf::traits::Producer::try_push(&mut tx, sent).is_ok());
        assert_eq!(ringbuf::traits::Consumer::try_pop(&mut rx), Some(sent));
        assert_eq!(ringbuf::traits::Consumer::try_pop(&mut rx), None);
    }
}
