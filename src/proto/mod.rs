//! Command codec for the storage controller wire protocol.
//!
//! Every request and response is one 64-bit register. Fields are packed
//! most-significant first: op (8 bits), sector (16 bits, two's complement,
//! -1 = unused), track (32 bits, two's complement, -1 = unused) and
//! status (8 bits, nonzero = failure).

/// 每个扇区的大小：1KB
/// 读写负载都以整个扇区为单位传输。
pub const SECTOR_SIZE: usize = 1024;

/// 定义一个扇区缓冲类型（每扇区 1KB 的字节数组）
pub type SectorBuf = [u8; SECTOR_SIZE];

/// Mount the remote device, establishing the session.
pub const OP_MOUNT: u8 = 0;
/// Position the device head on a track.
pub const OP_SEEK: u8 = 1;
/// Read one sector; the 1024-byte payload follows the response register.
pub const OP_READ: u8 = 2;
/// Write one sector; the 1024-byte payload follows the request register.
pub const OP_WRITE: u8 = 3;
/// Unmount the remote device; the connection closes afterwards.
pub const OP_UNMOUNT: u8 = 4;

const OP_SHIFT: u32 = 56;
const SECTOR_SHIFT: u32 = 40;
const TRACK_SHIFT: u32 = 8;

const OP_MASK: u64 = 0xff;
const SECTOR_MASK: u64 = 0xffff;
const TRACK_MASK: u64 = 0xffff_ffff;
const STATUS_MASK: u64 = 0xff;

/// One decoded command register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBlock {
    pub op: u8,
    pub sector: i16,
    pub track: i32,
    pub status: u8,
}

impl CommandBlock {
    pub fn mount() -> Self {
        Self { op: OP_MOUNT, sector: 0, track: 0, status: 0 }
    }

    pub fn seek(track: i32) -> Self {
        Self { op: OP_SEEK, sector: -1, track, status: 0 }
    }

    pub fn read(sector: i16, track: i32) -> Self {
        Self { op: OP_READ, sector, track, status: 0 }
    }

    pub fn write(sector: i16, track: i32) -> Self {
        Self { op: OP_WRITE, sector, track, status: 0 }
    }

    pub fn unmount() -> Self {
        Self { op: OP_UNMOUNT, sector: 0, track: 0, status: 0 }
    }

    /// Pack the four fields into one register value.
    pub fn encode(&self) -> u64 {
        ((self.op as u64) << OP_SHIFT)
            | ((self.sector as u16 as u64) << SECTOR_SHIFT)
            | ((self.track as u32 as u64) << TRACK_SHIFT)
            | (self.status as u64)
    }

    /// Unpack a register value. Never fails; out-of-range op codes are
    /// left for the caller to police.
    pub fn decode(register: u64) -> Self {
        Self {
            op: ((register >> OP_SHIFT) & OP_MASK) as u8,
            sector: ((register >> SECTOR_SHIFT) & SECTOR_MASK) as u16 as i16,
            track: ((register >> TRACK_SHIFT) & TRACK_MASK) as u32 as i32,
            status: (register & STATUS_MASK) as u8,
        }
    }

    /// Same register with a different status field, for responses.
    pub fn with_status(mut self, status: u8) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_all_ops() {
        for op in [OP_MOUNT, OP_SEEK, OP_READ, OP_WRITE, OP_UNMOUNT] {
            let cmd = CommandBlock { op, sector: 513, track: 42, status: 0 };
            assert_eq!(CommandBlock::decode(cmd.encode()), cmd);
        }
    }

    #[test]
    fn round_trip_unused_sentinels() {
        let cmd = CommandBlock { op: OP_SEEK, sector: -1, track: -1, status: 0 };
        let back = CommandBlock::decode(cmd.encode());
        assert_eq!(back.sector, -1);
        assert_eq!(back.track, -1);
        assert_eq!(back, cmd);
    }

    #[test]
    fn round_trip_field_extremes() {
        for sector in [i16::MIN, -1, 0, 1, i16::MAX] {
            for track in [i32::MIN, -1, 0, 1, i32::MAX] {
                for status in [0u8, 1, 255] {
                    let cmd = CommandBlock { op: OP_WRITE, sector, track, status };
                    assert_eq!(CommandBlock::decode(cmd.encode()), cmd);
                }
            }
        }
    }

    #[test]
    fn fields_do_not_overlap() {
        let cmd = CommandBlock { op: 0xff, sector: -1, track: -1, status: 0xff };
        assert_eq!(cmd.encode(), u64::MAX);
        let zero = CommandBlock { op: 0, sector: 0, track: 0, status: 0 };
        assert_eq!(zero.encode(), 0);
    }

    #[test]
    fn decode_arbitrary_register() {
        // No validation on decode; any bit pattern is accepted.
        let cmd = CommandBlock::decode(0xdead_beef_cafe_f00d);
        assert_eq!(cmd.op, 0xde);
        assert_eq!(cmd.status, 0x0d);
    }

    #[test]
    fn with_status_only_touches_status() {
        let cmd = CommandBlock::read(7, 3);
        let resp = cmd.with_status(1);
        assert_eq!(resp.op, cmd.op);
        assert_eq!(resp.sector, cmd.sector);
        assert_eq!(resp.track, cmd.track);
        assert_eq!(resp.status, 1);
    }
}
