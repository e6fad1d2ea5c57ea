//! 파서가 임의 바이트에 패닉하지 않는지 확인합니다.

#![no_main]

use libfuzzer_sys::fuzz_target;

use ceelog_canal::parse_bytes;

fuzz_target!(|data: &[u8]| {
    let _ = parse_bytes(data);
});
