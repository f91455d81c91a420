//! A simple example showing the use of a Bloom filter.
use bloomopt::BloomFilter;

fn main() -> bloomopt::Result<()> {
    let bf = BloomFilter::build(3, 128, ["foo", "bar"])?;

    bf.may_contain("foo"); // true
    bf.may_contain("bar"); // true
    bf.may_contain("baz"); // false

    bf.count_ones(); // at most 6

    Ok(())
}
