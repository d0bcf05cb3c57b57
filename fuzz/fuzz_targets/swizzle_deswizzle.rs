#![no_main]
use libfuzzer_sys::fuzz_target;

use arbitrary::{Arbitrary, Result, Unstructured};
use rand::{rngs::StdRng, Rng, SeedableRng};

use block_linear::swizzle::{deswizzle_block_linear, deswizzled_mip_size, swizzle_block_linear};

#[derive(Debug)]
struct Input {
    width: usize,
    height: usize,
    depth: usize,
    block_height: block_linear::BlockHeight,
    bytes_per_pixel: usize,
}

impl<'a> Arbitrary<'a> for Input {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        Ok(Input {
            width: u.int_in_range(0..=256)?,
            height: u.int_in_range(0..=256)?,
            depth: u.int_in_range(0..=32)?,
            block_height: u.arbitrary()?,
            bytes_per_pixel: u.int_in_range(0..=32)?,
        })
    }
}

fuzz_target!(|input: Input| {
    let deswizzled_size = deswizzled_mip_size(
        input.width,
        input.height,
        input.depth,
        input.bytes_per_pixel,
    );

    let seed = [13u8; 32];
    let mut rng: StdRng = SeedableRng::from_seed(seed);
    let deswizzled: Vec<_> = (0..deswizzled_size)
        .map(|_| rng.gen_range::<u8, _>(0..=255))
        .collect();

    let swizzled = swizzle_block_linear(
        input.width,
        input.height,
        input.depth,
        &deswizzled,
        input.block_height,
        input.bytes_per_pixel,
    )
    .unwrap();

    let new_deswizzled = deswizzle_block_linear(
        input.width,
        input.height,
        input.depth,
        &swizzled,
        input.block_height,
        input.bytes_per_pixel,
    )
    .unwrap();

    if deswizzled != new_deswizzled {
        panic!("Swizzle deswizzle is not 1:1");
    }
});
