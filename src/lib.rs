//! # block_linear
//! block_linear is an unofficial CPU implementation of the block linear
//! texture layout used by the Tegra X1 GPU in the Nintendo Switch.
//!
//! Block linear arranges the bytes of a texture surface into tiles called
//! GOBs ("group of bytes") of 512 bytes each. A GOB covers 64x8 bytes of the
//! image, and `block_height` many GOBs stack vertically to form a block.
//! Blocks are arranged linearly in row-major order, so the swizzled surface
//! is padded to integral dimensions in blocks and may be larger than the
//! tightly packed row-major data.
//!
//! # Getting Started
//! Most texture file formats for Switch games store all array layers and
//! mipmaps swizzled into a single contiguous buffer.
//! Use [surface::deswizzle_surface] to convert the entire buffer at once.
//! BC7 has 4x4 pixel blocks that each take up 16 bytes.
/*!
```rust no_run
use block_linear::surface::{deswizzle_surface, BlockDim};

# fn main() -> Result<(), block_linear::SwizzleError> {
# let image_data = vec![0u8; 4];
// A 512x512 BC7 cube map with 6 faces and a full mip chain.
let deswizzled = deswizzle_surface(
    512,
    512,
    1,
    &image_data,
    BlockDim::block_4x4(),
    None,
    16,
    10,
    6,
)?;
# Ok(())
# }
```
*/
//! For converting a single mip level with known parameters, see
//! [swizzle::swizzle_block_linear] and [swizzle::deswizzle_block_linear].
use thiserror::Error;

mod arrays;
mod blockdepth;
mod blockheight;

pub mod surface;
pub mod swizzle;

pub use blockheight::*;

pub(crate) const GOB_WIDTH_IN_BYTES: usize = 64;
pub(crate) const GOB_HEIGHT_IN_BYTES: usize = 8;
pub(crate) const GOB_SIZE_IN_BYTES: usize = GOB_WIDTH_IN_BYTES * GOB_HEIGHT_IN_BYTES;

// Block height can only have certain values based on the Tegra TRM page 1189 table 79.

/// The height of each block in GOBs where each GOB is 8 bytes tall.
///
/// Texture file formats differ in how they encode the block height parameter.
/// Some formats may encode block height using log2, so a block height of 8 would be encoded as 3.
/// For formats that do not explicitly store block height, see [block_height_mip0].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum BlockHeight {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
    Sixteen = 16,
    ThirtyTwo = 32,
}

impl BlockHeight {
    /// Attempts to construct a block height from `value`.
    /// Returns [None] if `value` is not a supported block height.
    /// # Examples
    /**
    ```rust
    use block_linear::BlockHeight;

    assert_eq!(Some(BlockHeight::Eight), BlockHeight::new(8));
    assert_eq!(None, BlockHeight::new(5));
    ```
    */
    pub fn new(value: usize) -> Option<Self> {
        match value {
            1 => Some(BlockHeight::One),
            2 => Some(BlockHeight::Two),
            4 => Some(BlockHeight::Four),
            8 => Some(BlockHeight::Eight),
            16 => Some(BlockHeight::Sixteen),
            32 => Some(BlockHeight::ThirtyTwo),
            _ => None,
        }
    }
}

/// Errors that can occur while swizzling or deswizzling.
#[derive(Debug, Error)]
pub enum SwizzleError {
    /// The source does not contain enough bytes for the given parameters.
    /// The expected size is computed by the sizing function matching the operation,
    /// like [surface::deswizzled_surface_size] for [surface::swizzle_surface].
    #[error("expected at least {expected_size} bytes but found {actual_size} bytes")]
    NotEnoughData {
        expected_size: usize,
        actual_size: usize,
    },
}

/// Calculates the division of `x` by `d` but rounds up rather than truncating.
///
/// # Examples
/// Use this function when calculating dimensions for block compressed formats like BC7.
/**
```rust
# use block_linear::div_round_up;
assert_eq!(2, div_round_up(8, 4));
assert_eq!(3, div_round_up(10, 4));
```
 */
/// Uncompressed formats are equivalent to 1x1 pixel blocks.
/// The call to [div_round_up] can simply be omitted in these cases.
/**
```rust
# use block_linear::div_round_up;
let n = 10;
assert_eq!(n, div_round_up(n, 1));
```
 */
#[inline]
pub const fn div_round_up(x: usize, d: usize) -> usize {
    (x + d - 1) / d
}

/// Rounds `x` up to the next multiple of `n`.
/**
```rust
# use block_linear::round_up;
assert_eq!(512, round_up(500, 256));
assert_eq!(512, round_up(512, 256));
```
 */
#[inline]
pub const fn round_up(x: usize, n: usize) -> usize {
    ((x + n - 1) / n) * n
}

pub(crate) const fn width_in_gobs(width: usize, bytes_per_pixel: usize) -> usize {
    div_round_up(width * bytes_per_pixel, GOB_WIDTH_IN_BYTES)
}

pub(crate) const fn height_in_blocks(height: usize, block_height: usize) -> usize {
    // Each block is block_height many GOBs tall.
    div_round_up(height, block_height * GOB_HEIGHT_IN_BYTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_in_gobs_block16() {
        assert_eq!(20, width_in_gobs(320 / 4, 16));
    }

    #[test]
    fn height_in_blocks_bc7() {
        assert_eq!(1, height_in_blocks(80, 16));
        assert_eq!(7, height_in_blocks(100, 2));
    }
}
