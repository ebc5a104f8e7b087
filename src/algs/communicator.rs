//! Thin façade over intra-process or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices*. Posting a send or receive never
//! blocks; `.wait()` on the handle does. For a fixed (source, destination, tag)
//! triple messages arrive in the order they were sent.

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;

/// Point-to-point communication interface.
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    /// Posts a receive of at most `buf.len()` bytes; longer messages are truncated.
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

/// Typed message tag. Each payload category owns a base tag; its header and
/// body travel on `base` and `base.offset(1)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct CommTag(u16);

impl CommTag {
    pub const fn new(tag: u16) -> Self {
        Self(tag)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Tag `n` steps above this one, wrapping at `u16::MAX`.
    pub const fn offset(self, n: u16) -> Self {
        Self(self.0.wrapping_add(n))
    }
}

/// Rank, size and communicator for one collective call.
///
/// Generation and distribution take this explicitly; nothing reads rank or
/// size from global state.
#[derive(Clone, Debug)]
pub struct DistContext<C> {
    comm: C,
    rank: usize,
    size: usize,
}

impl<C: Communicator> DistContext<C> {
    pub fn new(comm: C) -> Self {
        let rank = comm.rank();
        let size = comm.size().max(1);
        Self { comm, rank, size }
    }

    pub fn comm(&self) -> &C {
        &self.comm
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Rank 0 builds the global mesh and serves every other rank.
    pub fn is_root(&self) -> bool {
        self.rank == 0
    }
}

impl DistContext<NoComm> {
    /// Single-process context.
    pub fn serial() -> Self {
        Self::new(NoComm)
    }
}

/// No-op comm for serial runs: rank 0 of 1, never exchanges a message.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}
}

// --- RayonComm: intra-process / multi-thread ---
type Key = (usize, usize, u16); // (src, dst, tag)

/// Shared mailbox of an in-process world.
#[derive(Debug, Default)]
struct Mailbox {
    queues: DashMap<Key, VecDeque<Bytes>>,
    gate: Mutex<()>,
    arrived: Condvar,
}

impl Mailbox {
    fn post(&self, key: Key, data: Bytes) {
        self.queues.entry(key).or_default().push_back(data);
        let _gate = self.gate.lock();
        self.arrived.notify_all();
    }

    fn take(&self, key: &Key) -> Bytes {
        let mut gate = self.gate.lock();
        loop {
            if let Some(data) = self.queues.get_mut(key).and_then(|mut q| q.pop_front()) {
                return data;
            }
            self.arrived.wait(&mut gate);
        }
    }
}

/// Pending receive on a [`RayonComm`]; blocks in `wait` until the message arrives.
pub struct LocalHandle {
    mailbox: Arc<Mailbox>,
    key: Key,
    len: usize,
}

impl Wait for LocalHandle {
    fn wait(self) -> Option<Vec<u8>> {
        let data = self.mailbox.take(&self.key);
        let n = data.len().min(self.len);
        Some(data[..n].to_vec())
    }
}

/// In-process ranks sharing one mailbox, one thread per rank.
#[derive(Clone, Debug)]
pub struct RayonComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
}

impl RayonComm {
    /// Creates all `size` ranks of a fresh world.
    pub fn world(size: usize) -> Vec<RayonComm> {
        let mailbox = Arc::new(Mailbox::default());
        (0..size)
            .map(|rank| RayonComm {
                rank,
                size,
                mailbox: Arc::clone(&mailbox),
            })
            .collect()
    }
}

impl Communicator for RayonComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        self.mailbox
            .post((self.rank, peer, tag), Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle {
        LocalHandle {
            mailbox: Arc::clone(&self.mailbox),
            key: (peer, self.rank, tag),
            len: buf.len(),
        }
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{Communicator, Wait};
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, Destination, Source};

    /// MPI world communicator.
    ///
    /// Sends complete before `isend` returns (scoped immediate send plus wait),
    /// so the caller's buffer is free as soon as the handle exists.
    pub struct MpiComm {
        world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        pub fn new(world: SimpleCommunicator) -> Self {
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Self { world, rank, size }
        }

        /// Initializes MPI and wraps the world communicator. Keep the universe
        /// alive for as long as the communicator is used; MPI finalizes when it drops.
        pub fn init() -> Option<(MpiComm, mpi::environment::Universe)> {
            let universe = mpi::initialize()?;
            let comm = MpiComm::new(universe.world());
            Some((comm, universe))
        }

        pub fn world(&self) -> &SimpleCommunicator {
            &self.world
        }
    }

    /// Completed MPI operation; receives carry their payload.
    pub struct MpiHandle(Option<Vec<u8>>);

    impl Wait for MpiHandle {
        fn wait(self) -> Option<Vec<u8>> {
            self.0
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiHandle;
        type RecvHandle = MpiHandle;

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> MpiHandle {
            let process = self.world.process_at_rank(peer as i32);
            mpi::request::scope(|scope| {
                process
                    .immediate_send_with_tag(scope, buf, i32::from(tag))
                    .wait();
            });
            MpiHandle(None)
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiHandle {
            let process = self.world.process_at_rank(peer as i32);
            let (mut data, _status) = process.receive_vec_with_tag::<u8>(i32::from(tag));
            data.truncate(buf.len());
            MpiHandle(Some(data))
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
