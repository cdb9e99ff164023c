//! # 条带拆分与编织
//!
//! 按下标奇偶把一条字节流拆成两半，以及它的逆操作。

/// 拆分为偶数下标和奇数下标两部分。偶数部分的长度永远不小于奇数部分。
pub fn stripe(data: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut even = Vec::with_capacity(data.len().div_ceil(2));
    let mut odd = Vec::with_capacity(data.len() / 2);

    for pair in data.chunks(2) {
        even.push(pair[0]);
        if let Some(&b) = pair.get(1) {
            odd.push(b);
        }
    }

    (even, odd)
}

/// 交替合并：`even[0], odd[0], even[1], odd[1], ...`。
///
/// 任一半较长时，多出的字节依次追加在末尾，总长度等于两者之和。
pub fn weave(even: &[u8], odd: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(even.len() + odd.len());
    let mut evens = even.iter();
    let mut odds = odd.iter();

    loop {
        match (evens.next(), odds.next()) {
            (Some(&e), Some(&o)) => {
                out.push(e);
                out.push(o);
            }
            (Some(&e), None) => {
                out.push(e);
                out.extend(evens.by_ref());
                break;
            }
            (None, Some(&o)) => {
                out.push(o);
                out.extend(odds.by_ref());
                break;
            }
            (None, None) => break,
        }
    }

    out
}
