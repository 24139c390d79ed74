// Demo: build a small pattern and play it through a MIDI output.
// Connect the virtual "stepseq" port to a synth to hear it.

use stepseq::{
    Event, MidiSink, MidirSink, NoteEvent, NullSink, Sequencer, SequencerConfig,
    SequencerError, TimeUnit, create_notification_channel,
};

fn main() -> Result<(), SequencerError> {
    env_logger::init();

    println!("=== stepseq demo ===\n");

    let sink: Box<dyn MidiSink> = match MidirSink::new("stepseq") {
        Ok(sink) => {
            println!("MIDI output connected");
            Box::new(sink)
        }
        Err(err) => {
            eprintln!("No MIDI output ({err}), playing silently");
            Box::new(NullSink)
        }
    };

    let config = SequencerConfig::new(16, 4, 4, 120.0);
    let mut sequencer = Sequencer::new(config, sink);
    let (tx, mut rx) = create_notification_channel(256);
    sequencer.set_notifications(tx);

    let beat = TimeUnit::beats(1);
    sequencer.add_event(0, TimeUnit::beats(0), Event::Note(NoteEvent::new(60, 64, beat)))?;
    sequencer.add_event(0, TimeUnit::beats(2), Event::Note(NoteEvent::new(62, 64, beat)))?;
    // same event again: the store keeps a single copy
    sequencer.add_event(0, TimeUnit::beats(2), Event::Note(NoteEvent::new(62, 64, beat)))?;
    sequencer.add_event(1, TimeUnit::new(1, 2)?, Event::Note(NoteEvent::new(58, 64, beat)))?;
    sequencer.add_event(0, TimeUnit::beats(1), Event::Note(NoteEvent::new(61, 64, beat)))?;
    // a different note at an occupied time shares the dispatch batch
    sequencer.add_event(0, TimeUnit::beats(1), Event::Note(NoteEvent::new(63, 64, beat)))?;
    for (i, step_note) in [65, 60, 63, 62, 61, 62].iter().enumerate() {
        sequencer.add_event(
            0,
            TimeUnit::beats(3 + i as u64),
            Event::Note(NoteEvent::new(*step_note, 64, beat)),
        )?;
    }

    println!("Pattern:");
    for entry in sequencer.list_events(None, None) {
        println!("  ch{} @ {} beats: {:?}", entry.channel, entry.time, entry.event);
    }

    println!("\nPlaying at 120 BPM...");
    sequencer.play(120.0, TimeUnit::beats(0), TimeUnit::beats(10))?;
    sequencer.run();

    println!("\nNotifications:");
    while let Some(notification) = ringbuf::traits::Consumer::try_pop(&mut rx) {
        println!("  {notification:?}");
    }

    println!("\nDone");
    Ok(())
}
