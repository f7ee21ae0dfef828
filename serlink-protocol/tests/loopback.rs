//! End-to-end exchanges between two engines over in-memory ports

use heapless::Deque;
use proptest::prelude::*;
use serlink_hal::mock::{MockStream, SimClock};
use serlink_hal::SerialStream;
use serlink_protocol::{
    BufferReader, BufferWriter, CommConfig, Endianness, MessageKind, RxError, SerialComm,
    TxError,
};

type Port = MockStream<1024>;
type Comm<'buf> = SerialComm<'buf, Port, SimClock>;

fn endpoint<'buf>() -> Comm<'buf> {
    SerialComm::new(Port::new(), SimClock::new(1))
}

/// Move everything `from` has written into `to`'s receive queue
fn transfer(from: &mut Comm<'_>, to: &mut Comm<'_>) {
    let wire = from.stream().written().to_vec();
    from.stream_mut().clear_written();
    to.stream_mut().feed(&wire);
}

/// Change the last trailer digit so the checksum no longer matches
fn corrupt_trailer(wire: &mut [u8]) {
    let digit = wire.len() - 3;
    wire[digit] = if wire[digit] == b'0' { b'1' } else { b'0' };
}

#[test]
fn ascii_with_params() {
    let mut tx = endpoint();
    let mut rx = endpoint();

    tx.add(300u16).unwrap();
    tx.add(1.5f32).unwrap();
    tx.transmit_ascii(7);
    assert_eq!(tx.stream().written(), b"#7,300,1.500000;1031;\n");
    assert!(tx.tx_params().is_empty());

    transfer(&mut tx, &mut rx);
    assert_eq!(rx.receive(), MessageKind::Ascii);
    assert_eq!(rx.ascii_rx().id, 7);
    assert_eq!(rx.ascii_rx().num_params, 2);
    assert!(rx.ascii_rx().checksum_valid);

    // Too wide for u8; the cursor stays put for a retry
    assert_eq!(rx.rx_params().get_u8(), Err(serlink_protocol::ParamError::OutOfRange));
    assert_eq!(rx.rx_params().get_u16(), Ok(300));
    assert_eq!(rx.rx_params().get_f32(), Ok(1.5));
    assert!(rx.rx_params().at_end());
}

#[test]
fn ascii_signed_params() {
    let mut tx = endpoint();
    tx.tx_params().add_i8(-3).unwrap();
    tx.tx_params().add_u8(42).unwrap();
    tx.transmit_ascii(12);
    assert_eq!(tx.stream().written(), b"#12,-3,42;57299;\n");
}

#[test]
fn ascii_without_params() {
    let mut tx = endpoint();
    let mut rx = endpoint();

    tx.transmit_ascii(7);
    assert_eq!(tx.stream().written(), b"#7;38162;\n");

    transfer(&mut tx, &mut rx);
    assert_eq!(rx.receive(), MessageKind::Ascii);
    assert_eq!(rx.ascii_rx().id, 7);
    assert!(rx.ascii_rx().params().is_empty());
    assert!(rx.ascii_rx().checksum_valid);
}

#[test]
fn ack_exchange() {
    let mut tx = endpoint();
    let mut rx = endpoint();

    tx.transmit_ack(3, true);
    assert_eq!(tx.stream().written(), b"?3,1;2600;\n");
    tx.transmit_ack(3, false);
    transfer(&mut tx, &mut rx);

    assert_eq!(rx.receive(), MessageKind::Ack);
    assert_eq!((rx.ack_rx().id, rx.ack_rx().value), (3, true));
    assert!(rx.ack_rx().checksum_valid);

    assert_eq!(rx.receive(), MessageKind::Ack);
    assert!(!rx.ack_rx().value);
    assert!(rx.ack_rx().checksum_valid);

    assert_eq!(rx.receive(), MessageKind::None);
}

#[test]
fn string_exchange() {
    let mut tx = endpoint();
    let mut rx = endpoint();

    tx.transmit_string_text(1, b"hello").unwrap();
    assert_eq!(tx.stream().written(), b"\"1,5;hello;16039;\n");

    // Delimiters inside the payload are plain data
    tx.load_string(b"a;b#c,\"").unwrap();
    tx.transmit_string(2);
    transfer(&mut tx, &mut rx);

    assert_eq!(rx.receive(), MessageKind::String);
    assert_eq!(rx.string_rx().as_str(), Some("hello"));
    assert_eq!(rx.string_rx().length, 5);
    assert!(rx.string_rx().checksum_valid);

    assert_eq!(rx.receive(), MessageKind::String);
    assert_eq!(rx.string_rx().id, 2);
    assert_eq!(rx.string_rx().as_bytes(), b"a;b#c,\"");
    assert!(rx.string_rx().checksum_valid);
}

#[test]
fn string_longer_than_buffer_is_refused_on_transmit() {
    let mut tx = endpoint();
    let text = [b'x'; 200];
    assert_eq!(tx.transmit_string_text(1, &text), Err(TxError::StringTooLong));
    assert!(tx.stream().written().is_empty());
}

#[test]
fn binary_exchange_with_serializer() {
    let mut payload = [0u8; 16];
    let mut writer = BufferWriter::new(&mut payload, Endianness::Little);
    writer.put_u16(513).unwrap();
    writer.put_f32(-0.25).unwrap();
    writer.put_i32(-70_000).unwrap();
    let len = writer.position() as u16;

    let mut inbox = [0u8; 32];
    let mut tx = endpoint();
    let mut rx = endpoint();
    tx.assign_binary_tx_buffer(&payload, len).unwrap();
    rx.assign_binary_rx_buffer(&mut inbox);

    tx.transmit_binary(5).unwrap();
    transfer(&mut tx, &mut rx);

    assert_eq!(rx.receive(), MessageKind::Binary);
    let msg = rx.binary_rx();
    assert_eq!(msg.id, 5);
    assert_eq!(msg.length, len);
    assert!(msg.checksum_valid);

    let mut reader = BufferReader::new(msg.payload().unwrap(), Endianness::Little);
    assert_eq!(reader.get_u16(), Ok(513));
    assert_eq!(reader.get_f32(), Ok(-0.25));
    assert_eq!(reader.get_i32(), Ok(-70_000));
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn binary_transmit_requires_buffer() {
    let mut tx = endpoint();
    assert_eq!(tx.transmit_binary(1), Err(TxError::NoBinaryBuffer));
    assert!(tx.stream().written().is_empty());

    let payload = [1u8, 2, 3];
    assert_eq!(
        tx.assign_binary_tx_buffer(&payload, 4),
        Err(TxError::LengthExceedsBuffer)
    );
}

#[test]
fn oversized_binary_is_dropped() {
    let payload = [0xAAu8; 64];
    let mut inbox = [0u8; 8];
    let mut tx = endpoint();
    let mut rx = endpoint();
    tx.assign_binary_tx_buffer(&payload, 64).unwrap();
    rx.assign_binary_rx_buffer(&mut inbox);

    tx.transmit_binary(2).unwrap();
    transfer(&mut tx, &mut rx);

    assert_eq!(rx.receive(), MessageKind::None);
    assert_eq!(rx.last_error(), Some(RxError::BinaryOverflow));
    assert_eq!(rx.stream().pending(), 0);
    assert!(rx.stream().discards() >= 1);
    assert_eq!(rx.binary_rx().length, 0);
}

#[test]
fn corrupted_trailer_flags_every_kind() {
    let payload = [7u8, 8, 9];
    let mut inbox = [0u8; 8];
    let mut tx = endpoint();
    let mut rx = endpoint();
    tx.assign_binary_tx_buffer(&payload, 3).unwrap();
    rx.assign_binary_rx_buffer(&mut inbox);

    let kinds = [
        MessageKind::Ascii,
        MessageKind::Ack,
        MessageKind::Binary,
        MessageKind::String,
    ];

    for kind in kinds {
        match kind {
            MessageKind::Ascii => tx.transmit_ascii(1),
            MessageKind::Ack => tx.transmit_ack(1, true),
            MessageKind::Binary => tx.transmit_binary(1).unwrap(),
            MessageKind::String => tx.transmit_string_text(1, b"hi").unwrap(),
            MessageKind::None => unreachable!(),
        }
        let mut wire = tx.stream().written().to_vec();
        tx.stream_mut().clear_written();
        corrupt_trailer(&mut wire);
        rx.stream_mut().feed(&wire);

        assert_eq!(rx.receive(), kind);
        let valid = match kind {
            MessageKind::Ascii => rx.ascii_rx().checksum_valid,
            MessageKind::Ack => rx.ack_rx().checksum_valid,
            MessageKind::Binary => rx.binary_rx().checksum_valid,
            MessageKind::String => rx.string_rx().checksum_valid,
            MessageKind::None => unreachable!(),
        };
        assert!(!valid, "{:?} accepted a bad checksum", kind);
    }
}

#[test]
fn resync_after_line_noise() {
    let mut tx = endpoint();
    let mut rx = endpoint();
    rx.stream_mut().feed(b"\r\n>>> boot 1.2.3\r\n");

    tx.transmit_ack(9, true);
    transfer(&mut tx, &mut rx);

    assert_eq!(rx.receive(), MessageKind::Ack);
    assert_eq!(rx.ack_rx().id, 9);
    assert!(rx.ack_rx().checksum_valid);
}

#[test]
fn partial_frame_times_out() {
    let config = CommConfig {
        read_timeout_ms: 5,
        binary_extension_ms: 0,
    };
    let mut rx = SerialComm::with_config(Port::new(), SimClock::new(1), config);
    rx.stream_mut().feed(b"#7,30");

    assert_eq!(rx.receive(), MessageKind::None);
    assert_eq!(rx.last_error(), Some(RxError::Timeout));
    assert!(rx.clock().peek_ms() < 20);
}

#[test]
fn replacing_the_stream_keeps_records() {
    let mut rx = endpoint();
    rx.stream_mut().feed(b"?4,1;");

    let mut console = Port::new();
    console.feed(b"?3,1;2600;\n");
    let serial = rx.replace_stream(console);
    assert_eq!(serial.pending(), 5);

    assert_eq!(rx.receive(), MessageKind::Ack);
    assert_eq!(rx.ack_rx().id, 3);

    rx.transmit_ack(3, true);
    let (console, _clock) = rx.into_parts();
    assert_eq!(console.written(), b"?3,1;2600;\n");
}

/// Port that releases one queued byte every `interval_ms` of the shared clock
struct SlowPort<'a> {
    rx: Deque<u8, 256>,
    clock: &'a SimClock,
    interval_ms: u32,
    next_release_ms: u32,
}

impl<'a> SlowPort<'a> {
    fn new(clock: &'a SimClock, interval_ms: u32, bytes: &[u8]) -> Self {
        let mut rx = Deque::new();
        for &byte in bytes {
            rx.push_back(byte).unwrap();
        }
        Self {
            rx,
            clock,
            interval_ms,
            next_release_ms: clock.peek_ms(),
        }
    }

    fn released(&self) -> bool {
        self.clock.peek_ms() >= self.next_release_ms
    }
}

impl SerialStream for SlowPort<'_> {
    fn try_read_byte(&mut self) -> Option<u8> {
        if !self.released() {
            return None;
        }
        let byte = self.rx.pop_front()?;
        self.next_release_ms = self.clock.peek_ms() + self.interval_ms;
        Some(byte)
    }

    fn peek_byte(&mut self) -> Option<u8> {
        if self.released() {
            self.rx.front().copied()
        } else {
            None
        }
    }

    fn write_byte(&mut self, _byte: u8) {}

    fn discard_input(&mut self) {
        self.rx.clear();
    }
}

#[test]
fn binary_deadline_stretches_for_slow_payloads() {
    let payload = [0x5Au8; 100];
    let mut tx = endpoint();
    tx.assign_binary_tx_buffer(&payload, 100).unwrap();
    tx.transmit_binary(1).unwrap();
    let wire = tx.stream().written().to_vec();

    let clock = SimClock::new(1);
    let mut inbox = [0u8; 128];
    let mut rx = SerialComm::new(SlowPort::new(&clock, 5, &wire), &clock);
    rx.assign_binary_rx_buffer(&mut inbox);

    assert_eq!(rx.receive(), MessageKind::Binary);
    assert_eq!(rx.last_error(), None);
    assert_eq!(rx.binary_rx().payload(), Some(&payload[..]));
    assert!(rx.binary_rx().checksum_valid);

    // Took well past the plain read timeout, inside the extended one
    let elapsed = clock.peek_ms();
    assert!(elapsed > 100 && elapsed < 1000, "elapsed {} ms", elapsed);
}

#[test]
fn string_deadline_does_not_stretch() {
    let mut tx = endpoint();
    tx.transmit_string_text(1, &[b's'; 100]).unwrap();
    let wire = tx.stream().written().to_vec();

    let clock = SimClock::new(1);
    let mut rx = SerialComm::new(SlowPort::new(&clock, 5, &wire), &clock);

    assert_eq!(rx.receive(), MessageKind::None);
    assert_eq!(rx.last_error(), Some(RxError::Timeout));
}

proptest! {
    #[test]
    fn arbitrary_input_never_panics(noise in proptest::collection::vec(any::<u8>(), 0..600)) {
        let mut inbox = [0u8; 16];
        let mut rx = endpoint();
        rx.assign_binary_rx_buffer(&mut inbox);
        rx.stream_mut().feed(&noise);

        // Every call with input waiting consumes at least one byte
        while rx.stream().pending() > 0 {
            let kind = rx.receive();
            prop_assert!(usize::from(rx.binary_rx().length) <= 16);
            prop_assert!(rx.string_rx().as_bytes().len() <= serlink_protocol::STRING_CAPACITY);
            if kind == MessageKind::None {
                prop_assert!(!rx.ack_rx().checksum_valid);
            }
        }

        // The link recovers once the noise is gone
        rx.stream_mut().feed(b"?3,1;2600;\n");
        prop_assert_eq!(rx.receive(), MessageKind::Ack);
        prop_assert!(rx.ack_rx().checksum_valid);
    }

    #[test]
    fn ascii_params_survive_the_wire(a in any::<u32>(), b in any::<i16>(), c in any::<u8>()) {
        let mut tx = endpoint();
        let mut rx = endpoint();
        tx.add(a).unwrap();
        tx.add(b).unwrap();
        tx.add(c).unwrap();
        tx.transmit_ascii(200);
        transfer(&mut tx, &mut rx);

        prop_assert_eq!(rx.receive(), MessageKind::Ascii);
        prop_assert!(rx.ascii_rx().checksum_valid);
        prop_assert_eq!(rx.get::<u32>(), Ok(a));
        prop_assert_eq!(rx.get::<i16>(), Ok(b));
        prop_assert_eq!(rx.get::<u8>(), Ok(c));
    }
}
