use sectorfield_common::SectorCoord;

/// Derive the generation seed of a sector from the world seed.
///
/// Both coordinates are packed into one word and run through splitmix64
/// twice with the world seed folded in between, so neighbouring sectors and
/// neighbouring world seeds give unrelated streams. Pure and platform
/// independent.
pub fn sector_seed(world_seed: u64, coord: SectorCoord) -> u64 {
    let packed = ((coord.x as u32 as u64) << 32) | (coord.y as u32 as u64);
    splitmix64(splitmix64(world_seed) ^ packed)
}

/// Splitmix64 finalizer: a fast, well-distributed 64-bit mix.
pub(crate) fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
