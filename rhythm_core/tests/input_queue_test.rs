use rhythm_core::input::events::{InputEvent, KeyPress};
use rhythm_core::input::{InputQueue, KeyBindings};
use std::thread;

#[test]
fn test_input_queue_transmission() {
    let queue = InputQueue::new();
    let sender = queue.sender();

    // Spawn a producer thread
    let handle = thread::spawn(move || {
        sender.send(KeyPress { lane: 0, time: 1.0 }).unwrap();
        sender.send(KeyPress { lane: 3, time: 1.5 }).unwrap();
    });

    handle.join().unwrap();

    // Consumer (main test thread)
    assert_eq!(queue.len(), 2);
    let received1 = queue.pop().expect("Should receive first press");
    assert_eq!(received1.time, 1.0);
    assert_eq!(received1.lane, 0);

    let received2 = queue.pop().expect("Should receive second press");
    assert_eq!(received2.time, 1.5);
    assert_eq!(received2.lane, 3);

    // Queue should be empty now
    assert!(queue.pop().is_none());
    assert!(queue.is_empty());
}

#[test]
fn test_input_queue_ordering() {
    let queue = InputQueue::new();

    queue.push(KeyPress { lane: 1, time: 10.0 });
    queue.push(KeyPress { lane: 1, time: 11.0 });

    let e1 = queue.pop().unwrap();
    let e2 = queue.pop().unwrap();

    assert_eq!(e1.time, 10.0);
    assert_eq!(e2.time, 11.0);
}

#[test]
fn test_bindings_feed_queue() {
    let queue = InputQueue::new();
    let bindings = KeyBindings::default();

    let raw = [
        InputEvent { timestamp: 0.5, key: 'a', pressed: true },
        InputEvent { timestamp: 0.6, key: 'a', pressed: false },
        InputEvent { timestamp: 0.7, key: 'x', pressed: true },
        InputEvent { timestamp: 0.8, key: '\'', pressed: true },
    ];
    for event in &raw {
        if let Some(press) = bindings.translate(event) {
            queue.push(press);
        }
    }

    assert_eq!(queue.pop(), Some(KeyPress { lane: 0, time: 0.5 }));
    assert_eq!(queue.pop(), Some(KeyPress { lane: 3, time: 0.8 }));
    assert!(queue.pop().is_none());
}
