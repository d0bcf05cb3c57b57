//! Swizzling and deswizzling for a single mip level.
use crate::{
    blockdepth::block_depth, div_round_up, height_in_blocks, round_up, width_in_gobs, BlockHeight,
    SwizzleError, GOB_HEIGHT_IN_BYTES, GOB_SIZE_IN_BYTES, GOB_WIDTH_IN_BYTES,
};

// The gob address and slice size functions are ported from the Ryujinx emulator.
// https://github.com/Ryujinx/Ryujinx/blob/master/Ryujinx.Graphics.Texture/BlockLinearLayout.cs
// License MIT: https://github.com/Ryujinx/Ryujinx/blob/master/LICENSE.txt.

// Swizzled offsets of the eight rows of a GOB.
// Each row is four 16 byte runs at +0, +32, +256, and +288 from the row offset.
const GOB_ROW_OFFSETS: [usize; GOB_HEIGHT_IN_BYTES] = [0, 16, 64, 80, 128, 144, 192, 208];

/// Swizzles the bytes from `source` using the block linear swizzling algorithm.
///
/// Returns [SwizzleError::NotEnoughData] if `source` does not have
/// at least as many bytes as the result of [deswizzled_mip_size].
///
/// # Examples
/// Uncompressed formats like R8G8B8A8 can use the width and height in pixels.
/**
```rust
use block_linear::{BlockHeight, swizzle::{deswizzled_mip_size, swizzle_block_linear}};

let width = 512;
let height = 512;
# let size = deswizzled_mip_size(width, height, 1, 4);
# let input = vec![0u8; size];
let output = swizzle_block_linear(width, height, 1, &input, BlockHeight::Sixteen, 4);
```
 */
/// For compressed formats with multiple pixels in a block, divide the width and height by the block dimensions.
/**
```rust
# use block_linear::{BlockHeight, swizzle::{deswizzled_mip_size, swizzle_block_linear}};
// BC7 has 4x4 pixel blocks that each take up 16 bytes.
use block_linear::div_round_up;

let width = 512;
let height = 512;
# let size = deswizzled_mip_size(div_round_up(width, 4), div_round_up(height, 4), 1, 16);
# let input = vec![0u8; size];
let output = swizzle_block_linear(
    div_round_up(width, 4),
    div_round_up(height, 4),
    1,
    &input,
    BlockHeight::Sixteen,
    16,
);
```
 */
pub fn swizzle_block_linear(
    width: usize,
    height: usize,
    depth: usize,
    source: &[u8],
    block_height: BlockHeight,
    bytes_per_pixel: usize,
) -> Result<Vec<u8>, SwizzleError> {
    let expected_size = deswizzled_mip_size(width, height, depth, bytes_per_pixel);
    if source.len() < expected_size {
        return Err(SwizzleError::NotEnoughData {
            expected_size,
            actual_size: source.len(),
        });
    }

    let mut destination =
        vec![0u8; swizzled_mip_size(width, height, depth, block_height, bytes_per_pixel)];

    swizzle_inner::<false>(
        width,
        height,
        depth,
        source,
        &mut destination,
        block_height as usize,
        block_depth(depth),
        bytes_per_pixel,
    );
    Ok(destination)
}

/// Deswizzles the bytes from `source` using the block linear swizzling algorithm.
///
/// Returns [SwizzleError::NotEnoughData] if `source` does not have
/// at least as many bytes as the result of [swizzled_mip_size].
///
/// # Examples
/// Uncompressed formats like R8G8B8A8 can use the width and height in pixels.
/**
```rust
use block_linear::{BlockHeight, swizzle::{swizzled_mip_size, deswizzle_block_linear}};

let width = 512;
let height = 512;
# let size = swizzled_mip_size(width, height, 1, BlockHeight::Sixteen, 4);
# let input = vec![0u8; size];
let output = deswizzle_block_linear(width, height, 1, &input, BlockHeight::Sixteen, 4);
```
 */
/// For compressed formats with multiple pixels in a block, divide the width and height by the block dimensions.
/**
```rust
# use block_linear::{BlockHeight, swizzle::{swizzled_mip_size, deswizzle_block_linear}};
// BC7 has 4x4 pixel blocks that each take up 16 bytes.
use block_linear::div_round_up;

let width = 512;
let height = 512;
# let size = swizzled_mip_size(div_round_up(width, 4), div_round_up(height, 4), 1, BlockHeight::Sixteen, 16);
# let input = vec![0u8; size];
let output = deswizzle_block_linear(
    div_round_up(width, 4),
    div_round_up(height, 4),
    1,
    &input,
    BlockHeight::Sixteen,
    16,
);
```
 */
pub fn deswizzle_block_linear(
    width: usize,
    height: usize,
    depth: usize,
    source: &[u8],
    block_height: BlockHeight,
    bytes_per_pixel: usize,
) -> Result<Vec<u8>, SwizzleError> {
    let expected_size = swizzled_mip_size(width, height, depth, block_height, bytes_per_pixel);
    if source.len() < expected_size {
        return Err(SwizzleError::NotEnoughData {
            expected_size,
            actual_size: source.len(),
        });
    }

    let mut destination = vec![0u8; deswizzled_mip_size(width, height, depth, bytes_per_pixel)];

    swizzle_inner::<true>(
        width,
        height,
        depth,
        source,
        &mut destination,
        block_height as usize,
        block_depth(depth),
        bytes_per_pixel,
    );
    Ok(destination)
}

/// Calculates the size in bytes of the swizzled data for the given mip level.
/// The result is always at least as large as [deswizzled_mip_size]
/// for the same dimensions.
/// # Examples
/// Uncompressed formats like R8G8B8A8 can use the width and height in pixels.
/**
```rust
use block_linear::{BlockHeight, swizzle::swizzled_mip_size};

assert_eq!(262144, swizzled_mip_size(256, 256, 1, BlockHeight::Sixteen, 4));
```
 */
/// For compressed formats with multiple pixels in a block, divide the width and height by the block dimensions.
/**
```rust
# use block_linear::{BlockHeight, swizzle::swizzled_mip_size};
// BC7 has 4x4 pixel blocks that each take up 16 bytes.
use block_linear::div_round_up;

assert_eq!(
    131072,
    swizzled_mip_size(div_round_up(256, 4), div_round_up(256, 4), 1, BlockHeight::Sixteen, 16)
);
```
 */
pub const fn swizzled_mip_size(
    width: usize,
    height: usize,
    depth: usize,
    block_height: BlockHeight,
    bytes_per_pixel: usize,
) -> usize {
    // Blocks are always one GOB wide.
    let width_in_gobs = width_in_gobs(width, bytes_per_pixel);

    let height_in_gobs = height_in_blocks(height, block_height as usize) * block_height as usize;

    let depth_in_gobs = round_up(depth, block_depth(depth));

    width_in_gobs * height_in_gobs * depth_in_gobs * GOB_SIZE_IN_BYTES
}

/// Calculates the size in bytes of the deswizzled data for the given mip level.
/// Compare with [swizzled_mip_size].
/// # Examples
/// Uncompressed formats like R8G8B8A8 can use the width and height in pixels.
/**
```rust
use block_linear::swizzle::deswizzled_mip_size;

assert_eq!(262144, deswizzled_mip_size(256, 256, 1, 4));
```
 */
/// For compressed formats with multiple pixels in a block, divide the width and height by the block dimensions.
/**
```rust
# use block_linear::swizzle::deswizzled_mip_size;
// BC7 has 4x4 pixel blocks that each take up 16 bytes.
use block_linear::div_round_up;

assert_eq!(
    65536,
    deswizzled_mip_size(div_round_up(256, 4), div_round_up(256, 4), 1, 16)
);
```
 */
pub const fn deswizzled_mip_size(
    width: usize,
    height: usize,
    depth: usize,
    bytes_per_pixel: usize,
) -> usize {
    width * height * depth * bytes_per_pixel
}

// Swizzling is a mapping of byte coordinates x,y,z -> x',y',z'.
// The mapping is the same for every GOB, so the transform steps one 64x8 GOB
// of bytes at a time and reassigns a complete GOB with wide copies.
// Partially filled GOBs along the right and bottom edges fall back to a
// slower per byte implementation.
pub(crate) fn swizzle_inner<const DESWIZZLE: bool>(
    width: usize,
    height: usize,
    depth: usize,
    source: &[u8],
    destination: &mut [u8],
    block_height: usize,
    block_depth: usize,
    bytes_per_pixel: usize,
) {
    let width_in_bytes = width * bytes_per_pixel;
    let image_width_in_gobs = width_in_gobs(width, bytes_per_pixel);

    let slice_size = slice_size(block_height, block_depth, image_width_in_gobs, height);

    // Blocks are always one GOB wide.
    let block_size_in_bytes = GOB_SIZE_IN_BYTES * block_height * block_depth;
    let block_height_in_bytes = GOB_HEIGHT_IN_BYTES * block_height;

    for z0 in 0..depth {
        let offset_z = gob_address_z(z0, block_height, block_depth, slice_size);

        // Step by a GOB of bytes in y.
        for y0 in (0..height).step_by(GOB_HEIGHT_IN_BYTES) {
            let offset_y = gob_address_y(
                y0,
                block_height_in_bytes,
                block_size_in_bytes,
                image_width_in_gobs,
            );

            // Step by a GOB of bytes in x.
            // The bytes per pixel converts pixel coordinates to byte coordinates.
            // BCN formats pass in their width and height in blocks rather than pixels.
            for x0 in (0..width_in_bytes).step_by(GOB_WIDTH_IN_BYTES) {
                let offset_x = gob_address_x(x0, block_size_in_bytes);

                let gob_address = offset_z + offset_y + offset_x;

                if x0 + GOB_WIDTH_IN_BYTES < width_in_bytes && y0 + GOB_HEIGHT_IN_BYTES < height {
                    let linear_offset =
                        (z0 * width * height * bytes_per_pixel) + (y0 * width_in_bytes) + x0;

                    // Use optimized code to reassign bytes of a complete GOB.
                    if DESWIZZLE {
                        deswizzle_complete_gob(
                            &mut destination[linear_offset..],
                            &source[gob_address..],
                            width_in_bytes,
                        );
                    } else {
                        swizzle_complete_gob(
                            &mut destination[gob_address..],
                            &source[linear_offset..],
                            width_in_bytes,
                        );
                    }
                } else {
                    // There may be a row and column of partially filled GOBs.
                    swizzle_deswizzle_gob::<DESWIZZLE>(
                        destination,
                        source,
                        x0,
                        y0,
                        z0,
                        width,
                        height,
                        bytes_per_pixel,
                        gob_address,
                    );
                }
            }
        }
    }
}

fn slice_size(
    block_height: usize,
    block_depth: usize,
    width_in_gobs: usize,
    height: usize,
) -> usize {
    // A row of blocks spanning the image width.
    let rob_size = GOB_SIZE_IN_BYTES * block_height * block_depth * width_in_gobs;
    div_round_up(height, block_height * GOB_HEIGHT_IN_BYTES) * rob_size
}

fn gob_address_z(z: usize, block_height: usize, block_depth: usize, slice_size: usize) -> usize {
    // Each "column" of blocks has block_depth many GOBs.
    // A 16x16x16 RGBA8 3D texture has the following deswizzled GOB indices.
    // 0, 16, 1, 17, 2, 18, 3, 19, 4, 20, 5, 21, 6, 22, 7, 23, 8, 24,
    // 9, 25, 10, 26, 11, 27, 12, 28, 13, 29, 14, 30, 15, 31
    (z / block_depth * slice_size) + ((z & (block_depth - 1)) * GOB_SIZE_IN_BYTES * block_height)
}

fn gob_address_y(
    y: usize,
    block_height_in_bytes: usize,
    block_size_in_bytes: usize,
    image_width_in_gobs: usize,
) -> usize {
    let block_y = y / block_height_in_bytes;
    let block_inner_row = y % block_height_in_bytes / GOB_HEIGHT_IN_BYTES;
    block_y * block_size_in_bytes * image_width_in_gobs + block_inner_row * GOB_SIZE_IN_BYTES
}

// Code for offset_x and offset_y adapted from examples in the Tegra TRM page 1187.
fn gob_address_x(x: usize, block_size_in_bytes: usize) -> usize {
    let block_x = x / GOB_WIDTH_IN_BYTES;
    block_x * block_size_in_bytes
}

// Code taken from examples in the Tegra TRM page 1188.
// Return the offset within the GOB for the byte at location (x, y).
fn gob_offset(x: usize, y: usize) -> usize {
    ((x % 64) / 32) * 256 + ((y % 8) / 2) * 64 + ((x % 32) / 16) * 32 + (y % 2) * 16 + (x % 16)
}

fn swizzle_deswizzle_gob<const DESWIZZLE: bool>(
    destination: &mut [u8],
    source: &[u8],
    x0: usize,
    y0: usize,
    z0: usize,
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
    gob_address: usize,
) {
    for y in 0..GOB_HEIGHT_IN_BYTES {
        for x in 0..GOB_WIDTH_IN_BYTES {
            if y0 + y < height && x0 + x < width * bytes_per_pixel {
                let swizzled_offset = gob_address + gob_offset(x, y);
                let linear_offset = (z0 * width * height * bytes_per_pixel)
                    + ((y0 + y) * width * bytes_per_pixel)
                    + x0
                    + x;

                // Swap the addresses for swizzling vs deswizzling.
                if DESWIZZLE {
                    destination[linear_offset] = source[swizzled_offset];
                } else {
                    destination[swizzled_offset] = source[linear_offset];
                }
            }
        }
    }
}

// An optimized version of the gob_offset for an entire GOB worth of bytes.
// The swizzled GOB is a contiguous region of 512 bytes.
// The deswizzled GOB is a 64x8 2D region of memory, so rows are pitch apart.
fn deswizzle_complete_gob(dst: &mut [u8], src: &[u8], row_size_in_bytes: usize) {
    // The fixed iteration count allows the compiler to use SIMD loads and stores.
    for (row, src_offset) in GOB_ROW_OFFSETS.into_iter().enumerate() {
        deswizzle_gob_row(&mut dst[row_size_in_bytes * row..], &src[src_offset..]);
    }
}

fn deswizzle_gob_row(dst: &mut [u8], src: &[u8]) {
    // Start with the largest offset first to reduce bounds checks.
    dst[48..64].copy_from_slice(&src[288..304]);
    dst[32..48].copy_from_slice(&src[256..272]);
    dst[16..32].copy_from_slice(&src[32..48]);
    dst[0..16].copy_from_slice(&src[0..16]);
}

// The swizzle functions are identical but with the addresses swapped.
fn swizzle_complete_gob(dst: &mut [u8], src: &[u8], row_size_in_bytes: usize) {
    for (row, dst_offset) in GOB_ROW_OFFSETS.into_iter().enumerate() {
        swizzle_gob_row(&mut dst[dst_offset..], &src[row_size_in_bytes * row..]);
    }
}

fn swizzle_gob_row(dst: &mut [u8], src: &[u8]) {
    dst[288..304].copy_from_slice(&src[48..64]);
    dst[256..272].copy_from_slice(&src[32..48]);
    dst[32..48].copy_from_slice(&src[16..32]);
    dst[0..16].copy_from_slice(&src[0..16]);
}
