//! Multirate pipeline: polyphase FIR upsampling and IIR decimation.
//!
//! Nonlinear stages run at 8/16/64 times the base rate to keep the
//! harmonics they generate below Nyquist; this module provides the rate
//! converters around them:
//!
//! - [`FirUpSampler16`] - linear-phase 16× upsampler, 16 phases of 32 taps.
//! - [`DecimationLowpass`] - cascaded biquad (SOS) lowpass run at the
//!   oversampled rate; tables [`SOS_8_FOLD`], [`SOS_16_FOLD`],
//!   [`SOS_64_FOLD`] fold 8→2, 16→2 and 64→2 respectively.
//! - [`HalfBandIir`] - polyphase half-band allpass pair for the final 2→1.
//! - [`Decimator8`] / [`Decimator16`] / [`Decimator64`] - the composed
//!   frame-in, sample-out decimators.
//!
//! All coefficient tables are fixed elliptic/Butterworth designs; nothing
//! here depends on the sample rate.

/// Polyphase FIR upsampler, 16 output phases per input sample.
///
/// The prototype lowpass is linear-phase; its group delay is
/// [`INT_DELAY`](Self::INT_DELAY) base-rate samples.
#[derive(Debug, Clone)]
pub struct FirUpSampler16 {
    buf: [f32; 32],
}

impl Default for FirUpSampler16 {
    fn default() -> Self {
        Self { buf: [0.0; 32] }
    }
}

impl FirUpSampler16 {
    /// Integer group delay of the FIR prototype, in base-rate samples.
    pub const INT_DELAY: usize = 15;

    /// Zero the tap history.
    pub fn reset(&mut self) {
        self.buf = [0.0; 32];
    }

    /// Consume one base-rate sample, produce 16 oversampled phases.
    #[inline]
    pub fn process(&mut self, input: f32) -> [f32; 16] {
        self.buf.copy_within(0..31, 1);
        self.buf[0] = input;

        let mut output = [0.0f32; 16];
        for (out, phase) in output.iter_mut().zip(FIR_16_FOLD_UP.iter()) {
            let mut acc = 0.0;
            for (b, c) in self.buf.iter().zip(phase.iter()) {
                acc += b * c;
            }
            *out = acc;
        }
        output
    }
}

/// Cascade of `N` direct-form-I biquad sections sharing one signal path.
///
/// Constructed over a static second-order-section table; each `push` runs
/// the full cascade at the oversampled rate and `output` reads the last
/// section. Sections are chained with one sample of pipeline delay, which
/// is part of the measured decimator latency.
#[derive(Debug, Clone)]
pub struct DecimationLowpass<const N: usize> {
    co: &'static [[f32; 5]; N],
    x0: [f32; N],
    x1: [f32; N],
    x2: [f32; N],
    y0: [f32; N],
    y1: [f32; N],
    y2: [f32; N],
}

impl<const N: usize> DecimationLowpass<N> {
    /// Wrap a coefficient table. Sections are `[b0, b1, b2, a1, a2]`.
    pub fn new(co: &'static [[f32; 5]; N]) -> Self {
        Self {
            co,
            x0: [0.0; N],
            x1: [0.0; N],
            x2: [0.0; N],
            y0: [0.0; N],
            y1: [0.0; N],
            y2: [0.0; N],
        }
    }

    /// Zero all section states.
    pub fn reset(&mut self) {
        self.x0 = [0.0; N];
        self.x1 = [0.0; N];
        self.x2 = [0.0; N];
        self.y0 = [0.0; N];
        self.y1 = [0.0; N];
        self.y2 = [0.0; N];
    }

    /// Advance the cascade by one oversampled sample.
    #[inline]
    pub fn push(&mut self, input: f32) {
        self.x0[0] = input;
        for i in 1..N {
            self.x0[i] = self.y0[i - 1];
        }
        for i in 0..N {
            let c = &self.co[i];
            self.y0[i] = c[0] * self.x0[i] + c[1] * self.x1[i] + c[2] * self.x2[i]
                - c[3] * self.y1[i]
                - c[4] * self.y2[i];
        }
        self.x2 = self.x1;
        self.x1 = self.x0;
        self.y2 = self.y1;
        self.y1 = self.y0;
    }

    /// Output of the final section.
    #[inline]
    pub fn output(&self) -> f32 {
        self.y0[N - 1]
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct FirstOrderAllpass {
    x1: f32,
    y1: f32,
}

impl FirstOrderAllpass {
    #[inline]
    fn process(&mut self, a: f32, x0: f32) -> f32 {
        self.y1 = a * (x0 - self.y1) + self.x1;
        self.x1 = x0;
        self.y1
    }
}

/// Polyphase half-band IIR decimator (2→1).
///
/// Two chains of first-order allpass sections, one per input phase;
/// the output is their average. Phase 0 takes the earlier sample.
#[derive(Debug, Clone, Default)]
pub struct HalfBandIir {
    ap0: [FirstOrderAllpass; 9],
    ap1: [FirstOrderAllpass; 10],
}

impl HalfBandIir {
    /// Zero all allpass states.
    pub fn reset(&mut self) {
        self.ap0 = [FirstOrderAllpass::default(); 9];
        self.ap1 = [FirstOrderAllpass::default(); 10];
    }

    /// Consume a pair of consecutive samples, produce one.
    #[inline]
    pub fn process(&mut self, input: [f32; 2]) -> f32 {
        let mut s0 = input[0];
        for (ap, &a) in self.ap0.iter_mut().zip(HALF_BAND_H0.iter()) {
            s0 = ap.process(a, s0);
        }
        let mut s1 = input[1];
        for (ap, &a) in self.ap1.iter_mut().zip(HALF_BAND_H1.iter()) {
            s1 = ap.process(a, s1);
        }
        0.5 * (s0 + s1)
    }
}

macro_rules! decimator {
    ($name:ident, $doc:literal, $fold:literal, $sections:literal, $table:ident, $latency:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone)]
        pub struct $name {
            lowpass: DecimationLowpass<$sections>,
            halfband: HalfBandIir,
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    lowpass: DecimationLowpass::new(&$table),
                    halfband: HalfBandIir::default(),
                }
            }
        }

        impl $name {
            /// Measured impulse latency at the base rate, in samples.
            pub const LATENCY: usize = $latency;

            /// Zero all filter states.
            pub fn reset(&mut self) {
                self.lowpass.reset();
                self.halfband.reset();
            }

            /// Fold one oversampled frame down to a single output sample.
            #[inline]
            pub fn process(&mut self, frame: &[f32; $fold]) -> f32 {
                let half = $fold / 2;
                for &x in &frame[..half] {
                    self.lowpass.push(x);
                }
                let s0 = self.lowpass.output();
                for &x in &frame[half..] {
                    self.lowpass.push(x);
                }
                let s1 = self.lowpass.output();
                self.halfband.process([s0, s1])
            }
        }
    };
}

decimator!(
    Decimator8,
    "8× decimator: SOS cascade folding 8→2, half-band for the final 2→1.",
    8,
    5,
    SOS_8_FOLD,
    4
);
decimator!(
    Decimator16,
    "16× decimator: SOS cascade folding 16→2, half-band for the final 2→1.",
    16,
    8,
    SOS_16_FOLD,
    4
);
decimator!(
    Decimator64,
    "64× decimator: SOS cascade folding 64→2, half-band for the final 2→1.",
    64,
    8,
    SOS_64_FOLD,
    6
);

pub static SOS_8_FOLD: [[f32; 5]; 5] = [
    [1.6921576928941614e-05, 3.384315385788323e-05, 1.6921576928941614e-05, -0.7844963643040177, 0.1583016535071512],
    [1.0, 2.0, 1.0, -0.818202758191658, 0.20806883350989597],
    [1.0, 2.0, 1.0, -0.8910219912408522, 0.31558576014706946],
    [1.0, 2.0, 1.0, -1.0154057703544481, 0.49923726393009143],
    [1.0, 2.0, 1.0, -1.2147539782254588, 0.7935730560475367],
];

pub static SOS_16_FOLD: [[f32; 5]; 8] = [
    [3.5903469155931847e-12, 7.1806938311863695e-12, 3.5903469155931847e-12, -1.2759657610561284, 0.40787244610150275],
    [1.0, 2.0, 1.0, -1.2906502176887378, 0.42407495130188644],
    [1.0, 2.0, 1.0, -1.320459244427636, 0.456965573191349],
    [1.0, 2.0, 1.0, -1.3662708320207162, 0.5075130673741699],
    [1.0, 2.0, 1.0, -1.429387848302023, 0.5771549894497601],
    [1.0, 2.0, 1.0, -1.5114943545116066, 0.6677494954045713],
    [1.0, 2.0, 1.0, -1.6145439579130596, 0.7814521523555764],
    [1.0, 2.0, 1.0, -1.7405167001403739, 0.9204476945203488],
];

pub static SOS_64_FOLD: [[f32; 5]; 8] = [
    [1.354163914584143e-26, 2.708327829168286e-26, 1.354163914584143e-26, -1.9045872504279573, 0.9068841759295282],
    [1.0, 2.0, 1.0, -1.908001035290007, 0.9103020778040721],
    [1.0, 2.0, 1.0, -1.9147330871451047, 0.9170422484899456],
    [1.0, 2.0, 1.0, -1.9245914935233015, 0.9269125440714382],
    [1.0, 2.0, 1.0, -1.9372866598709455, 0.9396230207448886],
    [1.0, 2.0, 1.0, -1.9524305274354947, 0.9547851517602688],
    [1.0, 2.0, 1.0, -1.9695376181976627, 0.9719128736135145],
    [1.0, 2.0, 1.0, -1.9880295377862067, 0.9904270943918131],
];

pub static HALF_BAND_H0: [f32; 9] = [
    0.0765690656031399,
    0.264282270318935,
    0.47939467893641907,
    0.661681722389424,
    0.7924031566294969,
    0.8776927911111817,
    0.9308500986629166,
    0.9640156636878193,
    0.9862978287283355,
];

pub static HALF_BAND_H1: [f32; 10] = [
    0.019911761024506557,
    0.16170648261075027,
    0.37320978687920564,
    0.5766558985008232,
    0.7334355636406803,
    0.8399227128761151,
    0.9074601780285125,
    0.9492937701934973,
    0.9760539731706528,
    0.9955323321150525,
];

pub static FIR_16_FOLD_UP: [[f32; 32]; 16] = [
    [
        0.000000000000000, 4.710049084045554e-06, -8.91767480313468e-05, 0.0003318665036976312,
        -0.0009029355190602759, 0.0020103130118938567, -0.0039108232199485116, 0.006846006452087558,
        -0.010994067895928607, 0.016394932272087707, -0.022899510563565026, 0.030139906074162965,
        -0.03754763652461209, 0.04441586552368129, -0.05000320079278829, 0.0536563581385643,
        0.9450727576747361, 0.0536563581385643, -0.05000320079278829, 0.04441586552368129,
        -0.03754763652461209, 0.030139906074162965, -0.022899510563565026, 0.016394932272087707,
        -0.010994067895928607, 0.006846006452087558, -0.0039108232199485116, 0.0020103130118938567,
        -0.0009029355190602759, 0.0003318665036976312, -8.91767480313468e-05, 4.710049084045554e-06,
    ],
    [
        1.3479673515322202e-05, -6.653674007204556e-06, -5.84634321592889e-05, 0.00026964783145397704,
        -0.0008022588019898115, 0.0018843883768186523, -0.0038153560241077082, 0.00691037004319183,
        -0.011459536884283111, 0.017660810041711397, -0.025582816588426923, 0.03517255991060761,
        -0.04638792220871797, 0.05964357277159895, -0.07753958159867064, 0.11708115241647543,
        0.9395895134500334, -0.0037966492050887394, -0.022699964595321732, 0.0285134132009406,
        -0.02786788710334668, 0.024325373332777903, -0.01957014646036561, 0.014637502328099185,
        -0.010180768986647017, 0.006552635892362446, -0.0038666724001800218, 0.002058135209493373,
        -0.0009641081958538801, 0.0003764277936461807, -0.00011317194812522876, 1.4049313350164142e-05,
    ],
    [
        9.703922934794865e-06, -1.9890198537748112e-05, -2.1383395038703052e-05, 0.00019025938799197717,
        -0.0006622032572619759, 0.0016786776428574547, -0.003573646795731787, 0.00672839027491833,
        -0.011539519582625996, 0.0183622904540556, -0.027489998096875804, 0.039203780525624676,
        -0.05403100851892882, 0.07362137405852807, -0.10438155546098346, 0.18551434376573492,
        0.9232561387862673, -0.054487465007320435, 0.0035108812320078318, 0.012502761908825356,
        -0.01771718325712137, 0.01796460617158813, -0.015740529859447194, 0.012474509419633528,
        -0.009067221953740245, 0.00605449217580668, -0.003693954931272076, 0.002032162296534101,
        -0.0009870688640381503, 0.0004035285897779825, -0.00013040247649419103, 2.133090888007697e-05,
    ],
    [
        1.2763936533040183e-05, -3.474199150373041e-05, 2.140709424007283e-05, 9.49180551186065e-05,
        -0.00048443203467528074, 0.0013943899741018255, -0.003184069405785382, 0.006290717688516446,
        -0.011208255473759107, 0.01844304744889957, -0.028512242333653397, 0.042038744258082315,
        -0.06014302984956069, 0.08578448117448852, -0.1295568905547041, 0.2578388742557367,
        0.8964187216080176, -0.09781300376626244, 0.02785910408164383, -0.00307597160129911,
        -0.007461964682316679, 0.011300546124782195, -0.011566417664852165, 0.010001420565947525,
        -0.0077087147406803246, 0.005381433118070637, -0.0034074610587552516, 0.0019389630887573213,
        -0.0009743540932177976, 0.0004139832051857727, -0.00014106125576820053, 2.6600342651664725e-05,
    ],
    [
        1.607947200193808e-05, -5.0827311082251037e-05, 6.891961867747201e-05, -1.4371602956711715e-05,
        -0.0002722217177740313, 0.0010358153845066098, -0.0026504110673602433, 0.005596853827197398,
        -0.010453529597007261, 0.017866229148661015, -0.028567008943939227, 0.04351554690228815,
        -0.064426888927973, 0.09559808139598455, -0.1520746007365989, 0.3328078777833169,
        0.8596442052557635, -0.13336654402797954, 0.04968078004461383, -0.017725215650396725,
        0.002545582095007783, 0.004574804173132053, -0.007207664902493617, 0.0073193777259110675,
        -0.006165881629247218, 0.004567548873821048, -0.0030249461748891896, 0.0017869784165739058,
        -0.0009295513963859288, 0.00040912695452287334, -0.00014559182148270598, 2.9983659311536116e-05,
    ],
    [
        1.951819551734623e-05, -6.766962245519853e-05, 0.00011985100122193777, -0.00013485862543473318,
        -3.047720515685937e-05, 0.0006104022458092286, -0.001982110165895166, 0.004655733540001486,
        -0.009277911666460817, 0.016616853117648735, -0.027602354221803443, 0.04351260778784133,
        -0.0666345089436824, 0.10257693614017332, -0.1709524804335472, 0.4090724884044057,
        0.813705875381671, -0.16094135179759603, 0.06843178056277632, -0.03100394330656437,
        0.01197866312769322, -0.0019805202789144947, -0.0028225133836233983, 0.00453138960164905,
        -0.004502284978844274, 0.00364969957798612, -0.0025662981598160947, 0.0015860613377086748,
        -0.0008570751580271142, 0.0003907108219219258, -0.000144572025311346, 3.165559755790354e-05,
    ],
    [
        2.292027423928119e-05, -8.465915842685608e-05, 0.00017258765442065211, -0.0002630472283497376,
        0.00023431075928766928, 0.00012871926088374428, -0.0011943019636486416, 0.0034859905935713358,
        -0.00769951717580503, 0.01470353025812795, -0.025600360746098044, 0.041955008246504215,
        -0.06657797929998237, 0.1063043461184521, -0.18524547762799762, 0.48521289578202287,
        0.759563625581294, -0.18052889044597611, 0.08369719898118388, -0.042539184456460516,
        0.020545654418939463, -0.008150310454753227, 0.0014377816246666129, 0.0017386595750233202,
        -0.0027820259743428642, 0.002666053429565046, -0.0020526860419967153, 0.0013470268720799255,
        -0.0007619404606755493, 0.0003608018837120524, -0.0001387749559101323, 3.184514794042204e-05,
    ],
    [
        2.608615624166069e-05, -0.00010108397935197923, 0.00022524339213407982, -0.00039477665215476487,
        0.0005141854613472223, -0.0003957045458875576, -0.00030763689109161615, 0.0021158727942215106,
        -0.005752239740468992, 0.012159411908367439, -0.022579514226450468, 0.038819470973703155,
        -0.06413916878131061, 0.10644983846168542, -0.19407409197259143, 0.5597718257957642,
        0.6983395497678168, -0.19231180108293305, 0.09519657968861324, -0.052034807030786126,
        0.027998245212399724, -0.013742975919210006, 0.005433823805004525, -0.0009628364544560138,
        -0.001067478223047236, 0.0016546565841673655, -0.0015057230584022971, 0.0010811877546244523,
        -0.0006495193031586813, 0.0003216749071594291, -0.0001290049718072652, 3.080222524738068e-05,
    ],
    [
        2.879679065150001e-05, -0.00011613795493211648, 0.00027569918575506526, -0.0005253224928600103,
        0.0007999047715219641, -0.0009466701760656395, 0.0006521095174147799, 0.0005827960461315251,
        -0.0034854039362733225, 0.009042295451563999, -0.01859587826215821, 0.034137752240822515,
        -0.05927739504866232, 0.10278495906091381, -0.19665196099551444, 0.631289561605983,
        0.631289561605983, -0.19665196099551444, 0.10278495906091381, -0.05927739504866232,
        0.034137752240822515, -0.01859587826215821, 0.009042295451563999, -0.0034854039362733225,
        0.0005827960461315251, 0.0006521095174147799, -0.0009466701760656395, 0.0007999047715219641,
        -0.0005253224928600103, 0.00027569918575506526, -0.00011613795493211648, 2.879679065150001e-05,
    ],
    [
        3.080222524738068e-05, -0.0001290049718072652, 0.0003216749071594291, -0.0006495193031586813,
        0.0010811877546244523, -0.0015057230584022971, 0.0016546565841673655, -0.001067478223047236,
        -0.0009628364544560138, 0.005433823805004525, -0.013742975919210006, 0.027998245212399724,
        -0.052034807030786126, 0.09519657968861324, -0.19231180108293305, 0.6983395497678168,
        0.5597718257957642, -0.19407409197259143, 0.10644983846168542, -0.06413916878131061,
        0.038819470973703155, -0.022579514226450468, 0.012159411908367439, -0.005752239740468992,
        0.0021158727942215106, -0.00030763689109161615, -0.0003957045458875576, 0.0005141854613472223,
        -0.00039477665215476487, 0.00022524339213407982, -0.00010108397935197923, 2.608615624166069e-05,
    ],
    [
        3.184514794042204e-05, -0.0001387749559101323, 0.0003608018837120524, -0.0007619404606755493,
        0.0013470268720799255, -0.0020526860419967153, 0.002666053429565046, -0.0027820259743428642,
        0.0017386595750233202, 0.0014377816246666129, -0.008150310454753227, 0.020545654418939463,
        -0.042539184456460516, 0.08369719898118388, -0.18052889044597611, 0.759563625581294,
        0.48521289578202287, -0.18524547762799762, 0.1063043461184521, -0.06657797929998237,
        0.041955008246504215, -0.025600360746098044, 0.01470353025812795, -0.00769951717580503,
        0.0034859905935713358, -0.0011943019636486416, 0.00012871926088374428, 0.00023431075928766928,
        -0.0002630472283497376, 0.00017258765442065211, -8.465915842685608e-05, 2.292027423928119e-05,
    ],
    [
        3.165559755790354e-05, -0.000144572025311346, 0.0003907108219219258, -0.0008570751580271142,
        0.0015860613377086748, -0.0025662981598160947, 0.00364969957798612, -0.004502284978844274,
        0.00453138960164905, -0.0028225133836233983, -0.0019805202789144947, 0.01197866312769322,
        -0.03100394330656437, 0.06843178056277632, -0.16094135179759603, 0.813705875381671,
        0.4090724884044057, -0.1709524804335472, 0.10257693614017332, -0.0666345089436824,
        0.04351260778784133, -0.027602354221803443, 0.016616853117648735, -0.009277911666460817,
        0.004655733540001486, -0.001982110165895166, 0.0006104022458092286, -3.047720515685937e-05,
        -0.00013485862543473318, 0.00011985100122193777, -6.766962245519853e-05, 1.951819551734623e-05,
    ],
    [
        2.9983659311536116e-05, -0.00014559182148270598, 0.00040912695452287334, -0.0009295513963859288,
        0.0017869784165739058, -0.0030249461748891896, 0.004567548873821048, -0.006165881629247218,
        0.0073193777259110675, -0.007207664902493617, 0.004574804173132053, 0.002545582095007783,
        -0.017725215650396725, 0.04968078004461383, -0.13336654402797954, 0.8596442052557635,
        0.3328078777833169, -0.1520746007365989, 0.09559808139598455, -0.064426888927973,
        0.04351554690228815, -0.028567008943939227, 0.017866229148661015, -0.010453529597007261,
        0.005596853827197398, -0.0026504110673602433, 0.0010358153845066098, -0.0002722217177740313,
        -1.4371602956711715e-05, 6.891961867747201e-05, -5.0827311082251037e-05, 1.607947200193808e-05,
    ],
    [
        2.6600342651664725e-05, -0.00014106125576820053, 0.0004139832051857727, -0.0009743540932177976,
        0.0019389630887573213, -0.0034074610587552516, 0.005381433118070637, -0.0077087147406803246,
        0.010001420565947525, -0.011566417664852165, 0.011300546124782195, -0.007461964682316679,
        -0.00307597160129911, 0.02785910408164383, -0.09781300376626244, 0.8964187216080176,
        0.2578388742557367, -0.1295568905547041, 0.08578448117448852, -0.06014302984956069,
        0.042038744258082315, -0.028512242333653397, 0.01844304744889957, -0.011208255473759107,
        0.006290717688516446, -0.003184069405785382, 0.0013943899741018255, -0.00048443203467528074,
        9.49180551186065e-05, 2.140709424007283e-05, -3.474199150373041e-05, 1.2763936533040183e-05,
    ],
    [
        2.133090888007697e-05, -0.00013040247649419103, 0.0004035285897779825, -0.0009870688640381503,
        0.002032162296534101, -0.003693954931272076, 0.00605449217580668, -0.009067221953740245,
        0.012474509419633528, -0.015740529859447194, 0.01796460617158813, -0.01771718325712137,
        0.012502761908825356, 0.0035108812320078318, -0.054487465007320435, 0.9232561387862673,
        0.18551434376573492, -0.10438155546098346, 0.07362137405852807, -0.05403100851892882,
        0.039203780525624676, -0.027489998096875804, 0.0183622904540556, -0.011539519582625996,
        0.00672839027491833, -0.003573646795731787, 0.0016786776428574547, -0.0006622032572619759,
        0.00019025938799197717, -2.1383395038703052e-05, -1.9890198537748112e-05, 9.703922934794865e-06,
    ],
    [
        1.4049313350164142e-05, -0.00011317194812522876, 0.0003764277936461807, -0.0009641081958538801,
        0.002058135209493373, -0.0038666724001800218, 0.006552635892362446, -0.010180768986647017,
        0.014637502328099185, -0.01957014646036561, 0.024325373332777903, -0.02786788710334668,
        0.0285134132009406, -0.022699964595321732, -0.0037966492050887394, 0.9395895134500334,
        0.11708115241647543, -0.07753958159867064, 0.05964357277159895, -0.04638792220871797,
        0.03517255991060761, -0.025582816588426923, 0.017660810041711397, -0.011459536884283111,
        0.00691037004319183, -0.0038153560241077082, 0.0018843883768186523, -0.0008022588019898115,
        0.00026964783145397704, -5.84634321592889e-05, -6.653674007204556e-06, 1.3479673515322202e-05,
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fir_upsampler_unity_dc() {
        let mut up = FirUpSampler16::default();
        let mut phases = [0.0; 16];
        for _ in 0..64 {
            phases = up.process(1.0);
        }
        for (i, p) in phases.iter().enumerate() {
            assert!((p - 1.0).abs() < 1e-3, "phase {} gain {}", i, p);
        }
    }

    #[test]
    fn halfband_unity_dc() {
        let mut hb = HalfBandIir::default();
        let mut out = 0.0;
        for _ in 0..500 {
            out = hb.process([1.0, 1.0]);
        }
        assert!((out - 1.0).abs() < 1e-3, "dc gain {}", out);
    }

    #[test]
    fn halfband_rejects_nyquist() {
        // Alternating +1/-1 at the oversampled rate is the image band the
        // half-band stage must remove.
        let mut hb = HalfBandIir::default();
        let mut peak = 0.0f32;
        for i in 0..2000 {
            let out = hb.process([1.0, -1.0]);
            if i > 1000 {
                peak = peak.max(out.abs());
            }
        }
        assert!(peak < 1e-3, "nyquist leak {}", peak);
    }

    fn decimator_dc_gain<const FOLD: usize>(mut process: impl FnMut(&[f32; FOLD]) -> f32) -> f32 {
        let frame = [1.0f32; FOLD];
        let mut out = 0.0;
        for _ in 0..2000 {
            out = process(&frame);
        }
        out
    }

    #[test]
    fn decimators_unity_dc() {
        let mut d8 = Decimator8::default();
        let mut d16 = Decimator16::default();
        let mut d64 = Decimator64::default();
        let g8 = decimator_dc_gain(|f| d8.process(f));
        let g16 = decimator_dc_gain(|f| d16.process(f));
        let g64 = decimator_dc_gain(|f| d64.process(f));
        assert!((g8 - 1.0).abs() < 1e-3, "8x dc {}", g8);
        assert!((g16 - 1.0).abs() < 1e-3, "16x dc {}", g16);
        assert!((g64 - 1.0).abs() < 1e-3, "64x dc {}", g64);
    }

    fn impulse_peak_index<const FOLD: usize>(mut process: impl FnMut(&[f32; FOLD]) -> f32) -> usize {
        let mut peak_index = 0;
        let mut peak = 0.0f32;
        for n in 0..100 {
            let mut frame = [0.0f32; FOLD];
            if n == 0 {
                frame[0] = 1.0;
            }
            let out = process(&frame);
            if out.abs() > peak {
                peak = out.abs();
                peak_index = n;
            }
        }
        peak_index
    }

    #[test]
    fn decimator_latency_matches_impulse_peak() {
        let mut d8 = Decimator8::default();
        let mut d16 = Decimator16::default();
        let mut d64 = Decimator64::default();
        assert_eq!(impulse_peak_index(|f| d8.process(f)), Decimator8::LATENCY);
        assert_eq!(impulse_peak_index(|f| d16.process(f)), Decimator16::LATENCY);
        assert_eq!(impulse_peak_index(|f| d64.process(f)), Decimator64::LATENCY);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut d16 = Decimator16::default();
        let mut frame = [0.0f32; 16];
        frame[3] = 0.7;
        let first = d16.process(&frame);
        d16.process(&frame);
        d16.reset();
        let again = d16.process(&frame);
        assert_eq!(first, again);
    }

    #[test]
    fn sos_tables_are_stable_sections() {
        // Every section's poles must be inside the unit circle:
        // |a2| < 1 and |a1| < 1 + a2.
        for table in [&SOS_8_FOLD[..], &SOS_16_FOLD[..], &SOS_64_FOLD[..]] {
            for section in table {
                let a1 = section[3];
                let a2 = section[4];
                assert!(a2.abs() < 1.0);
                assert!(a1.abs() < 1.0 + a2);
            }
        }
    }
}
