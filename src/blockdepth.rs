// Block depth code ported from C# implementations of driver code by gdkchan.
// The code can be found here: https://github.com/KillzXGaming/Switch-Toolbox/pull/419#issuecomment-959980096
// This comes from the Ryujinx emulator: https://github.com/Ryujinx/Ryujinx/blob/master/LICENSE.txt.

// The depth analog of block height, measured in GOBs along the slice axis.
// This is derived from the dimensions rather than stored in texture files,
// so it stays out of the public API.
pub(crate) const fn block_depth(depth: usize) -> usize {
    let depth_and_half = depth + (depth / 2);
    if depth_and_half >= 16 {
        16
    } else if depth_and_half >= 8 {
        8
    } else if depth_and_half >= 4 {
        4
    } else if depth_and_half >= 2 {
        2
    } else {
        1
    }
}

pub(crate) fn mip_block_depth(mip_depth: usize, block_depth_mip0: usize) -> usize {
    let mut gob_depth = block_depth_mip0;
    while mip_depth <= gob_depth / 2 && gob_depth > 1 {
        gob_depth /= 2;
    }

    gob_depth
}
