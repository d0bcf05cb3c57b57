// Layer alignment code ported from C# implementations of driver code by gdkchan.
// The code can be found here: https://github.com/KillzXGaming/Switch-Toolbox/pull/419#issuecomment-959980096
// This comes from the Ryujinx emulator: https://github.com/Ryujinx/Ryujinx/blob/master/LICENSE.txt.
use crate::{round_up, BlockHeight, GOB_SIZE_IN_BYTES};

// The driver aligns each array layer to a full block of GOBs.
// The upstream code has a gob_blocks_in_tile_x parameter for sparse tiles,
// which is always 1 for the texture layouts supported here.
pub(crate) fn align_layer_size(
    layer_size: usize,
    height: usize,
    depth: usize,
    block_height_mip0: BlockHeight,
    depth_in_gobs: usize,
) -> usize {
    let mut gob_height = block_height_mip0 as usize;
    let mut gob_depth = depth_in_gobs;

    while height <= (gob_height / 2) * 8 && gob_height > 1 {
        gob_height /= 2;
    }

    while depth <= gob_depth / 2 && gob_depth > 1 {
        gob_depth /= 2;
    }

    let block_of_gobs_size = gob_height * gob_depth * GOB_SIZE_IN_BYTES;
    round_up(layer_size, block_of_gobs_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_layer_sizes() {
        // An aligned size stays unchanged.
        assert_eq!(1024, align_layer_size(1024, 16, 1, BlockHeight::Two, 1));

        // Everything else rounds up to a whole block of GOBs.
        assert_eq!(512, align_layer_size(100, 16, 1, BlockHeight::One, 1));
        assert_eq!(26624, align_layer_size(25088, 128, 1, BlockHeight::Four, 1));
    }

    #[test]
    fn align_layer_size_small_heights() {
        // Small surfaces align to fewer GOBs than the mip0 block height suggests.
        assert_eq!(512, align_layer_size(512, 8, 1, BlockHeight::Sixteen, 1));
        assert_eq!(1024, align_layer_size(513, 8, 1, BlockHeight::Sixteen, 1));
    }
}
