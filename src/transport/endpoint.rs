//! APCI Endpoint
//!
//! Couples a [`Transport`] with a [`SequenceCounter`] and an [`ApduAssembler`]. Every
//! Information frame sent takes its N(S) from the counter, and every frame received updates
//! the counter before it is returned, so the two cannot drift apart.
//!
//! Flow control follows the `k`/`w` parameters of [`ApciConfig`]: sending stops with
//! [`TransportError::WindowFull`] once `k` frames are unacknowledged, and an S-frame is sent
//! automatically after `w` Information frames have been received without acknowledgment.

use log::{debug, trace};

use crate::apci::{codec, Apdu, ApduAssembler, ControlFunction, Frame, SeqNr, SequenceCounter};
use crate::transport::{ApciConfig, Result, Transport, TransportError};

/// One side of an APCI session over a byte-stream transport
#[derive(Debug)]
pub struct ApciEndpoint<T: Transport> {
    transport: T,
    config: ApciConfig,
    counter: SequenceCounter,
    assembler: ApduAssembler,
    read_buffer: Vec<u8>,
}

impl<T: Transport> ApciEndpoint<T> {
    /// Wrap a connected transport without sending anything
    pub fn new(transport: T, config: ApciConfig) -> Result<Self> {
        config.validate()?;
        let read_buffer = vec![0u8; config.read_buffer_size];
        Ok(Self {
            transport,
            config,
            counter: SequenceCounter::new(),
            assembler: ApduAssembler::new(),
            read_buffer,
        })
    }

    /// Wrap a freshly connected transport and request data transfer
    ///
    /// This is the connection-established hook: it sends STARTDT act. The peer's STARTDT
    /// con arrives through [`poll`](Self::poll).
    pub fn connect(transport: T, config: ApciConfig) -> Result<Self> {
        let mut endpoint = Self::new(transport, config)?;
        endpoint.start_dt()?;
        Ok(endpoint)
    }

    /// Flow-control parameters
    pub fn config(&self) -> &ApciConfig {
        &self.config
    }

    /// Current sequence state
    pub fn counter(&self) -> &SequenceCounter {
        &self.counter
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send STARTDT act
    pub fn start_dt(&mut self) -> Result<()> {
        self.send_unnumbered(ControlFunction::StartActive)
    }

    /// Send STOPDT act
    pub fn stop_dt(&mut self) -> Result<()> {
        self.send_unnumbered(ControlFunction::StopActive)
    }

    /// Send TESTFR act
    pub fn test_fr(&mut self) -> Result<()> {
        self.send_unnumbered(ControlFunction::TestActive)
    }

    /// Send the confirmation matching an activation received from the peer
    ///
    /// Functions without a confirmation (confirmations themselves, unrecognized values)
    /// are ignored.
    pub fn confirm(&mut self, activation: ControlFunction) -> Result<()> {
        match activation.confirmation() {
            Some(confirmation) => self.send_unnumbered(confirmation),
            None => Ok(()),
        }
    }

    /// Send any Unnumbered frame
    pub fn send_unnumbered(&mut self, function: ControlFunction) -> Result<()> {
        debug!("-> U[{}]", function);
        self.transport.send(&codec::encode_unnumbered(function))?;
        Ok(())
    }

    /// Send an S-frame acknowledging everything received so far
    pub fn acknowledge(&mut self) -> Result<()> {
        let recv_seq = self.counter.recv_seq();
        debug!("-> S[recv: {}]", recv_seq);
        self.transport.send(&codec::encode_supervisory(recv_seq))?;
        self.counter.mark_acknowledged();
        Ok(())
    }

    /// Send an ASDU in an Information frame
    ///
    /// Returns the N(S) assigned to the frame. Nothing is sent and the counter is left
    /// unchanged when the window is full or the ASDU is too large.
    pub fn send_asdu(&mut self, asdu: &[u8]) -> Result<SeqNr> {
        if self.counter.unacknowledged() >= self.config.k {
            return Err(TransportError::WindowFull { k: self.config.k });
        }

        let send_seq = self.counter.send_seq();
        let recv_seq = self.counter.recv_seq();
        let apdu = codec::encode_information(send_seq, recv_seq, asdu)?;
        debug!("-> I[send: {}, recv: {}] {} bytes", send_seq, recv_seq, asdu.len());
        self.transport.send(&apdu)?;

        self.counter.next_send();
        self.counter.mark_acknowledged();
        Ok(send_seq)
    }

    /// Read from the transport until one APDU is complete
    ///
    /// The counter is updated before the APDU is returned: Information frames must carry
    /// the expected N(S), and the N(R) of I- and S-frames must acknowledge frames that were
    /// actually sent. Returns `Ok(None)` if the transport reports no data without closing
    /// (a non-blocking socket, for instance).
    ///
    /// # Errors
    ///
    /// [`TransportError::Closed`] when the peer closes the stream, I/O errors from the
    /// transport, and framing or sequence errors from the APCI layer.
    pub fn poll(&mut self) -> Result<Option<Apdu>> {
        loop {
            if let Some(apdu) = self.assembler.next_apdu()? {
                self.process(&apdu)?;
                return Ok(Some(apdu));
            }

            let n = match self.transport.recv(&mut self.read_buffer) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            trace!("<- {} bytes", n);
            self.assembler.extend(&self.read_buffer[..n]);
        }
    }

    fn process(&mut self, apdu: &Apdu) -> Result<()> {
        debug!("<- {}", apdu.frame);
        match apdu.frame {
            Frame::Information { send_seq, recv_seq } => {
                self.counter.receive(send_seq, recv_seq)?;
                if self.counter.pending_acks() >= self.config.w {
                    self.acknowledge()?;
                }
            }
            Frame::Supervisory { recv_seq } => {
                self.counter.observe(recv_seq)?;
            }
            Frame::Unnumbered { .. } => {}
        }
        Ok(())
    }
}
