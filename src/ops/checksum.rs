//! CRC primitive over image data.
//!
//! The primitive is a big-endian (MSB-first) CRC-32 core, poly 0x04C11DB7,
//! optionally wrapped in per-byte input bit reversal and whole-word output bit
//! reversal, then XORed with a constant. The BCA uses reversal on both sides,
//! seed 0 and a full complement ([`CrcParams::BCA`]); in catalogue terms that
//! is [`CRC_32_BCA`].

use crate::{ERASED_BYTE, Image};

/// MSB-first CRC-32 with no reflection and no final XOR. The seed is supplied
/// per digest.
const CRC_32_CORE: crc::Algorithm<u32> = crc::Algorithm {
    width: 32,
    poly: 0x04c1_1db7,
    init: 0x0000_0000,
    refin: false,
    refout: false,
    xorout: 0x0000_0000,
    check: 0x89a1_897f,
    residue: 0x0000_0000,
};

/// The BCA CRC in catalogue form.
pub const CRC_32_BCA: crc::Algorithm<u32> = crc::Algorithm {
    width: 32,
    poly: 0x04c1_1db7,
    init: 0x0000_0000,
    refin: true,
    refout: true,
    xorout: 0xffff_ffff,
    check: 0xd202_d277,
    residue: 0xdebb_20e3,
};

/// Parameters wrapped around the CRC-32 core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrcParams {
    pub reflect_in: bool,
    pub seed: u32,
    pub reflect_out: bool,
    pub xor_out: u32,
}

impl CrcParams {
    pub const BCA: CrcParams = CrcParams {
        reflect_in: true,
        seed: 0,
        reflect_out: true,
        xor_out: 0xFFFF_FFFF,
    };

    pub fn compute(&self, data: &[u8]) -> u32 {
        const CORE: crc::Crc<u32> = crc::Crc::<u32>::new(&CRC_32_CORE);

        let mut digest = CORE.digest_with_initial(self.seed);
        if self.reflect_in {
            let mut buf = [0u8; 256];
            for chunk in data.chunks(buf.len()) {
                for (dst, src) in buf.iter_mut().zip(chunk) {
                    *dst = src.reverse_bits();
                }
                digest.update(&buf[..chunk.len()]);
            }
        } else {
            digest.update(data);
        }

        let mut crc = digest.finalize();
        if self.reflect_out {
            crc = crc.reverse_bits();
        }
        crc ^ self.xor_out
    }
}

impl Image {
    /// Contiguous bytes from the lowest to the highest defined address, built
    /// in one buffer. Holes read as erased flash and later segments win on
    /// overlap.
    pub fn contiguous_data(&self) -> Vec<u8> {
        let (Some(start), Some(end)) = (self.min_address(), self.end_address()) else {
            return Vec::new();
        };

        let mut data = vec![ERASED_BYTE; (end - start) as usize];
        for segment in self.segments() {
            let offset = (segment.start_address - start) as usize;
            data[offset..offset + segment.len()].copy_from_slice(&segment.data);
        }
        data
    }
}

/// CRC-32 as used in the Bootloader Configuration Area.
pub fn crc32_bca(data: &[u8]) -> u32 {
    CrcParams::BCA.compute(data)
}
